//! Type computation.
//!
//! [`raw_type`] computes and memoizes the type of any node, one exhaustive
//! match over node kinds. [`type_of`] applies the stream rule on top: a
//! stream-valued expression has type `…T` only as the operand of `←` or
//! `∆` or as a bind's value, and `T` everywhere else. The evaluator applies
//! the same rule to values.

use lumen_ir::{BinaryOp, Name, Node, NodeKind, UnaryOp};
use lumen_stack::ensure_sufficient_stack;

use crate::builtins::{BuiltinMember, Receiver};
use crate::resolve::{resolve, resolve_structure, statement_defines, Definition};
use crate::ty::{FunctionType, Input, Reason, Refine, StructureType};
use crate::unit::split_number;
use crate::{Column, Context, Type, Unit};

/// Type of `node` where it stands.
pub fn type_of(node: &Node, ctx: &Context) -> Type {
    let ty = raw_type(node, ctx);
    if is_stream_position(node, ctx) {
        ty
    } else {
        ty.latest()
    }
}

/// Whether a stream in this position stays a stream.
pub fn is_stream_position(node: &Node, ctx: &Context) -> bool {
    let Some(parent) = ctx.parent(node) else {
        return false;
    };
    match parent.kind() {
        NodeKind::Previous(previous) => previous.stream.same(node),
        NodeKind::Changed(changed) => changed.stream.same(node),
        NodeKind::Bind(bind) => bind.value.as_ref().is_some_and(|v| v.same(node)),
        _ => false,
    }
}

/// Memoized type of `node`, streams included.
pub fn raw_type(node: &Node, ctx: &Context) -> Type {
    if let Some(ty) = ctx.cached_type(node) {
        return ty;
    }
    if !ctx.enter(node) {
        return Type::unknown(Reason::Cycle, node);
    }
    let ty = ensure_sufficient_stack(|| compute(node, ctx));
    ctx.exit(node);
    ctx.store_type(node, &ty);
    ty
}

fn union_all(types: impl IntoIterator<Item = Type>, ctx: &Context) -> Type {
    types
        .into_iter()
        .reduce(|a, b| Type::union_of(a, b, ctx))
        .unwrap_or(Type::Never)
}

fn compute(node: &Node, ctx: &Context) -> Type {
    match node.kind() {
        NodeKind::Program(program) => raw_type(&program.block, ctx),
        NodeKind::Block(block) => match block.statements.last() {
            None if block.open.is_some() => Type::unknown(Reason::NoExpression, node),
            None => Type::None,
            Some(last) => raw_type(last, ctx).latest(),
        },
        NodeKind::Bind(_) => bind_type(node, ctx),
        NodeKind::BooleanLiteral(_) => Type::Boolean,
        NodeKind::NumberLiteral(literal) => match split_number(literal.number.text()) {
            Some((_, unit)) => Type::Number(unit),
            None => Type::unknown(Reason::UnitOverflow, node),
        },
        NodeKind::TextLiteral(_) => Type::Text,
        NodeKind::NoneLiteral(_) => Type::None,
        NodeKind::ListLiteral(list) => {
            Type::list(union_all(list.items.iter().map(|i| type_of(i, ctx)), ctx))
        }
        NodeKind::SetLiteral(set) => {
            Type::set(union_all(set.items.iter().map(|i| type_of(i, ctx)), ctx))
        }
        NodeKind::MapLiteral(map) => {
            let mut keys = Vec::new();
            let mut values = Vec::new();
            for entry in &map.entries {
                if let NodeKind::KeyValue(pair) = entry.kind() {
                    keys.push(type_of(&pair.key, ctx));
                    values.push(type_of(&pair.value, ctx));
                }
            }
            Type::map(union_all(keys, ctx), union_all(values, ctx))
        }
        NodeKind::KeyValue(pair) => type_of(&pair.value, ctx),
        NodeKind::TableLiteral(table) => Type::Table(columns_of(&table.header.children(), ctx)),
        NodeKind::Reference(reference) => match resolve(reference.name_text().as_str(), node, ctx) {
            Some(definition) => definition_type(&definition, ctx),
            None => Type::unknown(Reason::UnknownName(reference.name_text()), node),
        },
        NodeKind::This(_) => this_type(node, ctx),
        NodeKind::PropertyReference(property) => {
            let Some(name) = property.name_text() else {
                return Type::unknown(Reason::Unparsable, node);
            };
            let receiver = type_of(&property.structure, ctx);
            if receiver.is_unknown() {
                return Type::caused_by(&receiver, node);
            }
            if matches!(receiver, Type::Any) {
                return Type::Any;
            }
            member_type(&receiver, name.as_str(), ctx)
                .unwrap_or_else(|| Type::unknown(Reason::UnknownProperty(name), node))
        }
        NodeKind::Evaluate(evaluate) => {
            let callee = type_of(&evaluate.function, ctx);
            match callee {
                Type::Function(function) => match function.refine {
                    Some(Refine::ListOfFunctionOutput) => {
                        let output = evaluate
                            .inputs
                            .first()
                            .map(|input| type_of(input, ctx))
                            .and_then(|ty| ty.as_function().map(|f| (*f.output).clone()))
                            .unwrap_or(Type::Any);
                        Type::list(output)
                    }
                    Some(Refine::FirstInput) => evaluate
                        .inputs
                        .first()
                        .map_or(Type::Any, |input| type_of(input, ctx)),
                    None => *function.output,
                },
                Type::Unknown(_) => Type::caused_by(&callee, node),
                Type::Any => Type::Any,
                _ => Type::unknown(Reason::NotAFunction, node),
            }
        }
        NodeKind::FunctionDefinition(_) => Type::Function(function_type(node, ctx)),
        NodeKind::StructureDefinition(_) => Type::Function(structure_creator(node, ctx)),
        NodeKind::ConversionDefinition(conversion) => Type::Function(FunctionType::new(
            vec![Input::required("value", raw_type(&conversion.input, ctx))],
            raw_type(&conversion.output, ctx),
        )),
        NodeKind::BinaryOperation(operation) => {
            let op = BinaryOp::from_symbol(operation.operator.text());
            binary_type(op, &operation.left, &operation.right, node, ctx)
        }
        NodeKind::UnaryOperation(operation) => {
            match UnaryOp::from_symbol(operation.operator.text()) {
                Some(UnaryOp::Not) => Type::Boolean,
                _ => match type_of(&operation.operand, ctx) {
                    ty @ (Type::Number(_) | Type::Any) => ty,
                    ty @ Type::Unknown(_) => Type::caused_by(&ty, node),
                    _ => Type::unitless(),
                },
            }
        }
        NodeKind::Conditional(conditional) => Type::union_of(
            type_of(&conditional.yes, ctx),
            type_of(&conditional.no, ctx),
            ctx,
        ),
        NodeKind::Is(_) | NodeKind::Changed(_) => Type::Boolean,
        NodeKind::Convert(convert) => raw_type(&convert.ty, ctx),
        NodeKind::Previous(previous) => {
            let stream = type_of(&previous.stream, ctx);
            match stream {
                Type::Stream(item) => Type::optional(*item),
                Type::Unknown(_) => Type::caused_by(&stream, node),
                other => Type::optional(other),
            }
        }
        NodeKind::Reaction(reaction) => Type::union_of(
            type_of(&reaction.initial, ctx),
            type_of(&reaction.next, ctx),
            ctx,
        ),
        NodeKind::Documented(documented) => type_of(&documented.expression, ctx),
        NodeKind::Select(select) => {
            let table = type_of(&select.table, ctx);
            if table.columns().is_none() {
                return Type::caused_by(&table, node);
            }
            let wanted: Vec<Name> = select
                .row
                .children()
                .iter()
                .filter_map(|cell| match cell.kind() {
                    NodeKind::Reference(r) => Some(r.name_text()),
                    _ => None,
                })
                .collect();
            if wanted.is_empty() {
                return table;
            }
            let columns = table.columns().unwrap_or_default();
            Type::Table(
                wanted
                    .iter()
                    .filter_map(|name| columns.iter().find(|c| &c.name == name).cloned())
                    .collect(),
            )
        }
        NodeKind::Insert(op) => type_of(&op.table, ctx),
        NodeKind::Update(op) => type_of(&op.table, ctx),
        NodeKind::Delete(op) => type_of(&op.table, ctx),
        NodeKind::ExpressionPlaceholder(placeholder) => match &placeholder.ty {
            Some(ty) => raw_type(ty, ctx),
            None => Type::unknown(Reason::Placeholder, node),
        },
        NodeKind::UnparsableExpression(_) | NodeKind::UnparsableType(_) => {
            Type::unknown(Reason::Unparsable, node)
        }
        NodeKind::BooleanType(_) => Type::Boolean,
        NodeKind::NumberType(number) => {
            match Unit::parse(number.number.text().trim_start_matches('#')) {
                Some(unit) => Type::Number(unit),
                None => Type::unknown(Reason::UnitOverflow, node),
            }
        }
        NodeKind::TextType(_) => Type::Text,
        NodeKind::NoneType(_) => Type::None,
        NodeKind::ListType(list) => Type::list(optional_type(list.item.as_ref(), ctx)),
        NodeKind::SetType(set) => Type::set(optional_type(set.item.as_ref(), ctx)),
        NodeKind::MapType(map) => Type::map(
            optional_type(map.key.as_ref(), ctx),
            optional_type(map.value.as_ref(), ctx),
        ),
        NodeKind::TableType(table) => Type::Table(columns_of(&table.columns, ctx)),
        NodeKind::FunctionType(function) => Type::Function(FunctionType::new(
            inputs_of(&function.inputs, ctx),
            optional_type(function.output.as_ref(), ctx),
        )),
        NodeKind::StreamType(stream) => Type::stream(optional_type(stream.item.as_ref(), ctx)),
        NodeKind::UnionType(union) => Type::union_of(
            raw_type(&union.left, ctx),
            raw_type(&union.right, ctx),
            ctx,
        ),
        NodeKind::NameType(name) => match resolve_structure(name.name.text(), node, ctx) {
            Some(definition) => Type::Structure(StructureType {
                name: Name::new(name.name.text()),
                definition,
            }),
            None => Type::unknown(
                Reason::UnknownTypeName(Name::new(name.name.text())),
                node,
            ),
        },
        NodeKind::TypePlaceholder(_) => Type::unknown(Reason::Placeholder, node),
        NodeKind::Token(_)
        | NodeKind::Borrow(_)
        | NodeKind::Docs(_)
        | NodeKind::Alias(_)
        | NodeKind::Row(_) => Type::Any,
    }
}

fn optional_type(node: Option<&Node>, ctx: &Context) -> Type {
    node.map_or(Type::Any, |node| raw_type(node, ctx))
}

/// Type of a bind: its declared type, else its value's type, else what
/// the surrounding evaluation expects of it.
pub fn bind_type(node: &Node, ctx: &Context) -> Type {
    let NodeKind::Bind(bind) = node.kind() else {
        return Type::Any;
    };
    if let Some(ty) = &bind.ty {
        return raw_type(ty, ctx);
    }
    if let Some(value) = &bind.value {
        return raw_type(value, ctx);
    }
    expected_input_type(node, ctx).unwrap_or(Type::Any)
}

/// Type an untyped input of a function literal gets from the function
/// input it is passed to, as in `list.translate(ƒ(item) item · 2)`.
fn expected_input_type(bind: &Node, ctx: &Context) -> Option<Type> {
    let function = ctx.parent(bind)?;
    let NodeKind::FunctionDefinition(definition) = function.kind() else {
        return None;
    };
    let input_index = definition.inputs.iter().position(|i| i.same(bind))?;
    let evaluate = ctx.parent(&function)?;
    let NodeKind::Evaluate(call) = evaluate.kind() else {
        return None;
    };
    let argument_index = call.inputs.iter().position(|i| i.same(&function))?;
    let callee = type_of(&call.function, ctx);
    let expected = &callee.as_function()?.inputs.get(argument_index)?.ty;
    let expected = expected.as_function()?;
    Some(expected.inputs.get(input_index)?.ty.clone())
}

fn inputs_of(binds: &[Node], ctx: &Context) -> Vec<Input> {
    binds
        .iter()
        .filter_map(|node| match node.kind() {
            NodeKind::Bind(bind) => Some(Input {
                name: bind.primary_name().unwrap_or_else(|| Name::new("_")),
                ty: bind_type(node, ctx).latest(),
                optional: bind.has_default(),
                definition: Some(node.clone()),
            }),
            _ => None,
        })
        .collect()
}

/// Columns declared by header binds.
pub fn columns_of(binds: &[Node], ctx: &Context) -> Vec<Column> {
    inputs_of(binds, ctx)
        .into_iter()
        .map(|input| Column {
            name: input.name,
            ty: input.ty,
            has_default: input.optional,
            definition: input.definition,
        })
        .collect()
}

pub fn function_type(node: &Node, ctx: &Context) -> FunctionType {
    let NodeKind::FunctionDefinition(function) = node.kind() else {
        return FunctionType::new(Vec::new(), Type::Any);
    };
    let output = match (&function.output, &function.body) {
        (Some(output), _) => raw_type(output, ctx),
        (None, Some(body)) => type_of(body, ctx),
        (None, None) => Type::unknown(Reason::Placeholder, node),
    };
    FunctionType {
        inputs: inputs_of(&function.inputs, ctx),
        output: Box::new(output),
        definition: Some(node.clone()),
        refine: None,
    }
}

/// A structure definition used as a function: its inputs in, an instance
/// out.
pub fn structure_creator(node: &Node, ctx: &Context) -> FunctionType {
    let NodeKind::StructureDefinition(structure) = node.kind() else {
        return FunctionType::new(Vec::new(), Type::Any);
    };
    FunctionType {
        inputs: inputs_of(&structure.inputs, ctx),
        output: Box::new(Type::Structure(StructureType {
            name: structure.name_text().unwrap_or_else(|| Name::new("_")),
            definition: node.clone(),
        })),
        definition: Some(node.clone()),
        refine: None,
    }
}

pub fn definition_type(definition: &Definition, ctx: &Context) -> Type {
    match definition {
        Definition::Bind(node) | Definition::Function(node) | Definition::Structure(node) => {
            raw_type(node, ctx)
        }
        Definition::Column(column) => column.ty.clone(),
        Definition::Stream(kind) => kind.creator_type(),
    }
}

/// Type of property `name` on a value of type `receiver`.
pub fn member_type(receiver: &Type, name: &str, ctx: &Context) -> Option<Type> {
    match receiver {
        Type::Structure(structure) => structure_member(&structure.definition, name, ctx),
        other => {
            let member = BuiltinMember::find(Receiver::of(other)?, name)?;
            Some(Type::Function(member.signature(other)))
        }
    }
}

/// An input, bind or function of a structure, by name.
pub fn structure_member_definition(structure: &Node, name: &str) -> Option<Node> {
    let NodeKind::StructureDefinition(definition) = structure.kind() else {
        return None;
    };
    let input = definition.inputs.iter().find(|input| match input.kind() {
        NodeKind::Bind(bind) => bind.has_name(name),
        _ => false,
    });
    if let Some(input) = input {
        return Some(input.clone());
    }
    definition
        .body
        .as_ref()?
        .children()
        .iter()
        .find_map(|statement| statement_defines(statement, name).map(|_| statement.clone()))
}

fn structure_member(structure: &Node, name: &str, ctx: &Context) -> Option<Type> {
    structure_member_definition(structure, name).map(|node| raw_type(&node, ctx).latest())
}

fn this_type(node: &Node, ctx: &Context) -> Type {
    let mut child = node.clone();
    for ancestor in ctx.ancestors(node) {
        match ancestor.kind() {
            NodeKind::Reaction(reaction) if reaction.next.same(&child) => {
                return type_of(&reaction.initial, ctx);
            }
            NodeKind::ConversionDefinition(conversion) if conversion.body.same(&child) => {
                return raw_type(&conversion.input, ctx);
            }
            _ => {}
        }
        child = ancestor;
    }
    Type::unknown(Reason::UnknownName(Name::new(".")), node)
}

/// An integer exponent written as a literal, e.g. the `2` in `x ^ 2`.
pub fn literal_exponent(node: &Node) -> Option<i32> {
    match node.kind() {
        NodeKind::NumberLiteral(literal) => {
            let (magnitude, unit) = split_number(literal.number.text())?;
            let integral = unit.is_unitless() && magnitude.fract() == 0.0 && magnitude.abs() < 1e6;
            integral.then_some(magnitude as i32)
        }
        NodeKind::UnaryOperation(operation) if operation.operator.text() == "-" => {
            literal_exponent(&operation.operand).map(|n| -n)
        }
        _ => None,
    }
}

fn binary_type(op: Option<BinaryOp>, left: &Node, right: &Node, node: &Node, ctx: &Context) -> Type {
    let Some(op) = op else {
        return Type::unknown(Reason::Unparsable, node);
    };
    if !op.is_arithmetic() {
        return Type::Boolean;
    }
    let left_type = type_of(left, ctx);
    let right_type = type_of(right, ctx);
    match (&left_type, op) {
        (Type::Unknown(_), _) => Type::caused_by(&left_type, node),
        (Type::Any, _) => Type::Any,
        (Type::Text, BinaryOp::Add) => Type::Text,
        (Type::Number(unit), _) => {
            let other = right_type.as_number().cloned().unwrap_or_default();
            let composed = match op {
                BinaryOp::Mul => unit.product(&other),
                BinaryOp::Div => unit.quotient(&other),
                BinaryOp::Pow => literal_exponent(right).map_or_else(|| Some(unit.clone()), |n| unit.power(n)),
                _ => Some(unit.clone()),
            };
            match composed {
                Some(unit) => Type::Number(unit),
                None => Type::unknown(Reason::UnitOverflow, node),
            }
        }
        _ => Type::unitless(),
    }
}
