//! Local conflict rules, one per node kind.

use lumen_ir::{BinaryOp, Name, Node, NodeKind, UnaryOp};
use rustc_hash::FxHashSet;

use crate::conversion::find_conversion;
use crate::infer::{literal_exponent, member_type, raw_type, type_of};
use crate::resolve::{
    reference_order, resolve, resolve_structure, structure_functions, Definition, Order,
};
use crate::{Arg, Column, Conflict, ConflictKind as Kind, Context, Type};

/// Conflicts caused by `node` itself, ignoring its children.
pub fn local_conflicts(node: &Node, ctx: &Context) -> Vec<Conflict> {
    let mut out = Vec::new();
    match node.kind() {
        NodeKind::Program(_) => borrows(node, ctx, &mut out),
        NodeKind::Block(block) => {
            let in_structure = ctx
                .parent(node)
                .is_some_and(|p| matches!(p.kind(), NodeKind::StructureDefinition(_)));
            if !in_structure {
                duplicates(&block.statements, &mut out);
                if block.open.is_some() {
                    let ends_in_expression = block
                        .statements
                        .last()
                        .is_some_and(|last| !matches!(last.kind(), NodeKind::Bind(_)));
                    if !ends_in_expression {
                        out.push(Conflict::new(Kind::ExpectedEndingExpression, node));
                    }
                }
            }
            let unused = if in_structure {
                &block.statements[..]
            } else {
                &block.statements[..block.statements.len().saturating_sub(1)]
            };
            for statement in unused {
                if is_ignorable(statement) {
                    out.push(Conflict::new(Kind::IgnoredExpression, statement));
                }
            }
        }
        NodeKind::Bind(bind) => {
            if let (Some(ty), Some(value)) = (&bind.ty, &bind.value) {
                let expected = raw_type(ty, ctx);
                let given = type_of(value, ctx);
                if incompatible(&expected, &given, ctx) {
                    out.push(
                        Conflict::new(Kind::IncompatibleBind, value)
                            .with_secondary(ty)
                            .with_arg(Arg::Type(expected))
                            .with_arg(Arg::Type(given)),
                    );
                }
            }
        }
        NodeKind::Reference(reference) => reference_rule(node, &reference.name_text(), ctx, &mut out),
        NodeKind::NameType(name) => {
            if resolve_structure(name.name.text(), node, ctx).is_none() {
                out.push(
                    Conflict::new(Kind::UnknownTypeName, node)
                        .with_arg(Arg::Name(Name::new(name.name.text()))),
                );
            }
        }
        NodeKind::This(_) => {
            if !this_is_placed(node, ctx) {
                out.push(Conflict::new(Kind::MisplacedThis, node));
            }
        }
        NodeKind::PropertyReference(property) => match property.name_text() {
            None => out.push(Conflict::new(Kind::Unparsable, node)),
            Some(name) => {
                let receiver = type_of(&property.structure, ctx);
                if !receiver.is_vague() && member_type(&receiver, name.as_str(), ctx).is_none() {
                    out.push(
                        Conflict::new(Kind::UnknownProperty, node)
                            .with_arg(Arg::Name(name))
                            .with_arg(Arg::Type(receiver)),
                    );
                }
            }
        },
        NodeKind::Evaluate(evaluate) => {
            evaluate_rule(node, &evaluate.function, &evaluate.inputs, ctx, &mut out);
        }
        NodeKind::FunctionDefinition(function) => {
            if let (Some(output), Some(body)) = (&function.output, &function.body) {
                let expected = raw_type(output, ctx);
                let given = type_of(body, ctx);
                if incompatible(&expected, &given, ctx) {
                    out.push(
                        Conflict::new(Kind::IncompatibleOutput, body)
                            .with_secondary(output)
                            .with_arg(Arg::Type(expected))
                            .with_arg(Arg::Type(given)),
                    );
                }
            }
            required_after_optional(&function.inputs, &mut out);
            duplicates(&function.inputs, &mut out);
        }
        NodeKind::StructureDefinition(structure) => {
            required_after_optional(&structure.inputs, &mut out);
            let mut members = structure.inputs.clone();
            if let Some(body) = &structure.body {
                members.extend(body.children().into_iter().filter(|c| c.as_token().is_none()));
            }
            duplicates(&members, &mut out);
            interfaces(node, &structure.interfaces, ctx, &mut out);
        }
        NodeKind::Conditional(conditional) => {
            boolean_condition(&conditional.condition, ctx, &mut out);
        }
        NodeKind::Reaction(reaction) => boolean_condition(&reaction.condition, ctx, &mut out),
        NodeKind::BinaryOperation(operation) => {
            if let Some(op) = BinaryOp::from_symbol(operation.operator.text()) {
                binary_rule(node, op, &operation.left, &operation.right, ctx, &mut out);
            }
        }
        NodeKind::UnaryOperation(operation) => {
            let operand = type_of(&operation.operand, ctx);
            let fits = match UnaryOp::from_symbol(operation.operator.text()) {
                Some(UnaryOp::Not) => operand.is_boolean(),
                _ => operand.as_number().is_some(),
            };
            if !operand.is_vague() && !fits {
                out.push(
                    Conflict::new(Kind::IncompatibleOperand, &operation.operand)
                        .with_arg(Arg::Node(operation.operator.clone()))
                        .with_arg(Arg::Type(operand.clone()))
                        .with_arg(Arg::Type(operand)),
                );
            }
        }
        NodeKind::Previous(previous) => expect_stream(&previous.stream, ctx, &mut out),
        NodeKind::Changed(changed) => expect_stream(&changed.stream, ctx, &mut out),
        NodeKind::Convert(convert) => {
            let from = type_of(&convert.expression, ctx);
            let to = raw_type(&convert.ty, ctx);
            if !from.is_vague()
                && !to.is_vague()
                && find_conversion(&from, &to, node, ctx).is_none()
            {
                out.push(
                    Conflict::new(Kind::UnknownConversion, node)
                        .with_arg(Arg::Type(from))
                        .with_arg(Arg::Type(to)),
                );
            }
        }
        NodeKind::TableLiteral(table) => {
            let NodeKind::Row(header) = table.header.kind() else {
                return out;
            };
            for cell in &header.cells {
                match cell.kind() {
                    NodeKind::Bind(bind) if bind.ty.is_none() => out.push(
                        Conflict::new(Kind::ExpectedColumnType, cell)
                            .with_arg(Arg::Name(bind.primary_name().unwrap_or_else(|| Name::new("_")))),
                    ),
                    NodeKind::Bind(_) => {}
                    _ => out.push(
                        Conflict::new(Kind::ExpectedColumnType, cell).with_arg(Arg::Node(cell.clone())),
                    ),
                }
            }
            duplicates(&header.cells, &mut out);
            if let Some(columns) = type_of(node, ctx).columns() {
                for row in &table.rows {
                    row_cells(row, columns, ctx, &mut out);
                }
            }
        }
        NodeKind::Insert(op) => {
            if let Some(columns) = table_columns(&op.table, &op.row, ctx, &mut out) {
                row_cells(&op.row, &columns, ctx, &mut out);
            }
        }
        NodeKind::Select(op) => {
            if let Some(columns) = table_columns(&op.table, &op.row, ctx, &mut out) {
                for cell in op.row.children() {
                    if let NodeKind::Reference(reference) = cell.kind() {
                        let name = reference.name_text();
                        if !columns.iter().any(|c| c.name == name) {
                            out.push(Conflict::new(Kind::UnknownColumn, &cell).with_arg(Arg::Name(name)));
                        }
                    }
                }
            }
            boolean_query(&op.query, ctx, &mut out);
        }
        NodeKind::Update(op) => {
            if let Some(columns) = table_columns(&op.table, &op.row, ctx, &mut out) {
                for cell in op.row.children() {
                    update_cell(&cell, &columns, ctx, &mut out);
                }
            }
            boolean_query(&op.query, ctx, &mut out);
        }
        NodeKind::Delete(op) => {
            table_columns(&op.table, &op.row, ctx, &mut out);
            boolean_query(&op.query, ctx, &mut out);
        }
        NodeKind::ExpressionPlaceholder(_) | NodeKind::TypePlaceholder(_) => {
            out.push(Conflict::new(Kind::Placeholder, node));
        }
        NodeKind::UnparsableExpression(_) | NodeKind::UnparsableType(_) => {
            out.push(Conflict::new(Kind::Unparsable, node));
        }
        _ => {}
    }
    out
}

/// `expected` does not accept `given`, and both are known well enough to
/// say so.
fn incompatible(expected: &Type, given: &Type, ctx: &Context) -> bool {
    !expected.is_vague() && !given.is_vague() && !expected.accepts(given, ctx)
}

fn is_ignorable(statement: &Node) -> bool {
    !matches!(
        statement.kind(),
        NodeKind::Bind(_)
            | NodeKind::FunctionDefinition(_)
            | NodeKind::StructureDefinition(_)
            | NodeKind::ConversionDefinition(_)
            | NodeKind::UnparsableExpression(_)
            | NodeKind::ExpressionPlaceholder(_)
    )
}

/// Name nodes a statement introduces, for duplicate detection.
fn declared_names(statement: &Node) -> Vec<(Name, Node)> {
    match statement.kind() {
        NodeKind::Bind(bind) => bind
            .names
            .iter()
            .filter_map(|alias| match alias.kind() {
                NodeKind::Alias(a) => a.name_text().map(|name| (name, alias.clone())),
                _ => None,
            })
            .collect(),
        NodeKind::FunctionDefinition(function) => function
            .name
            .iter()
            .filter_map(|token| function.name_text().map(|name| (name, token.clone())))
            .collect(),
        NodeKind::StructureDefinition(structure) => structure
            .name
            .iter()
            .filter_map(|token| structure.name_text().map(|name| (name, token.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

/// Names declared twice in one scope, and names differing only by case.
fn duplicates(statements: &[Node], out: &mut Vec<Conflict>) {
    let mut seen: Vec<(Name, Node)> = Vec::new();
    for statement in statements {
        for (name, node) in declared_names(statement) {
            if let Some((_, first)) = seen.iter().find(|(earlier, _)| *earlier == name) {
                out.push(
                    Conflict::new(Kind::DuplicateName, &node)
                        .with_secondary(first)
                        .with_arg(Arg::Name(name.clone())),
                );
            } else if let Some((earlier, first)) =
                seen.iter().find(|(earlier, _)| earlier.folded() == name.folded())
            {
                out.push(
                    Conflict::new(Kind::CaseCollision, &node)
                        .with_secondary(first)
                        .with_arg(Arg::Name(name.clone()))
                        .with_arg(Arg::Name(earlier.clone())),
                );
            }
            seen.push((name, node));
        }
    }
}

fn required_after_optional(inputs: &[Node], out: &mut Vec<Conflict>) {
    let mut optional: Option<&Node> = None;
    for input in inputs {
        let NodeKind::Bind(bind) = input.kind() else {
            continue;
        };
        match (bind.has_default(), optional) {
            (true, None) => optional = Some(input),
            (false, Some(earlier)) => out.push(
                Conflict::new(Kind::RequiredAfterOptional, input)
                    .with_secondary(earlier)
                    .with_arg(Arg::Name(bind.primary_name().unwrap_or_else(|| Name::new("_")))),
            ),
            _ => {}
        }
    }
}

fn reference_rule(node: &Node, name: &Name, ctx: &Context, out: &mut Vec<Conflict>) {
    // Select columns are checked by the select rule.
    let in_select_row = ctx.parent(node).is_some_and(|row| {
        matches!(row.kind(), NodeKind::Row(_))
            && ctx
                .parent(&row)
                .is_some_and(|op| matches!(op.kind(), NodeKind::Select(_)))
    });
    if in_select_row {
        return;
    }
    match resolve(name.as_str(), node, ctx) {
        None => out.push(Conflict::new(Kind::UnknownName, node).with_arg(Arg::Name(name.clone()))),
        Some(Definition::Bind(bind)) => match reference_order(node, &bind, ctx) {
            Order::Within => out.push(
                Conflict::new(Kind::ReferenceCycle, node)
                    .with_secondary(&bind)
                    .with_arg(Arg::Name(name.clone())),
            ),
            Order::Before => {
                out.push(Conflict::new(Kind::UnknownName, node).with_arg(Arg::Name(name.clone())));
            }
            Order::After => {}
        },
        Some(_) => {}
    }
}

fn this_is_placed(node: &Node, ctx: &Context) -> bool {
    let mut child = node.clone();
    for ancestor in ctx.ancestors(node) {
        match ancestor.kind() {
            NodeKind::Reaction(reaction) if reaction.next.same(&child) => return true,
            NodeKind::ConversionDefinition(conversion) if conversion.body.same(&child) => {
                return true;
            }
            _ => {}
        }
        child = ancestor;
    }
    false
}

fn evaluate_rule(node: &Node, function: &Node, inputs: &[Node], ctx: &Context, out: &mut Vec<Conflict>) {
    let callee = type_of(function, ctx);
    let Type::Function(signature) = callee else {
        if !callee.is_vague() {
            out.push(Conflict::new(Kind::NotAFunction, function).with_arg(Arg::Type(callee)));
        }
        return;
    };
    for (index, given_node) in inputs.iter().enumerate() {
        let Some(expected) = signature.inputs.get(index) else {
            let mut conflict = Conflict::new(Kind::UnexpectedInput, given_node)
                .with_arg(Arg::Count(signature.inputs.len()));
            if let Some(definition) = &signature.definition {
                conflict = conflict.with_secondary(definition);
            }
            out.push(conflict);
            continue;
        };
        let given = type_of(given_node, ctx);
        if incompatible(&expected.ty, &given, ctx) {
            let mut conflict = Conflict::new(Kind::IncompatibleInput, given_node)
                .with_arg(Arg::Type(expected.ty.clone()))
                .with_arg(Arg::Type(given))
                .with_arg(Arg::Name(expected.name.clone()));
            if let Some(definition) = &expected.definition {
                conflict = conflict.with_secondary(definition);
            }
            out.push(conflict);
        }
    }
    for missing in signature.inputs.iter().skip(inputs.len()) {
        if missing.optional {
            continue;
        }
        let mut conflict = Conflict::new(Kind::MissingInput, node)
            .with_arg(Arg::Name(missing.name.clone()))
            .with_arg(Arg::Type(missing.ty.clone()));
        if let Some(definition) = &missing.definition {
            conflict = conflict.with_secondary(definition);
        }
        out.push(conflict);
    }
}

fn interfaces(structure: &Node, references: &[Node], ctx: &Context, out: &mut Vec<Conflict>) {
    let implemented: FxHashSet<Name> = structure_functions(structure)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    let structure_name = match structure.kind() {
        NodeKind::StructureDefinition(s) => s.name_text().unwrap_or_else(|| Name::new("_")),
        _ => Name::new("_"),
    };
    for reference in references {
        let NodeKind::Reference(r) = reference.kind() else {
            continue;
        };
        match resolve(r.name_text().as_str(), reference, ctx) {
            Some(Definition::Structure(interface)) => {
                for (name, function) in structure_functions(&interface) {
                    if !implemented.contains(&name) {
                        out.push(
                            Conflict::new(Kind::UnimplementedInterface, structure)
                                .with_secondary(&function)
                                .with_arg(Arg::Name(structure_name.clone()))
                                .with_arg(Arg::Name(name)),
                        );
                    }
                }
            }
            // Unknown names are reported by the reference rule.
            None => {}
            Some(_) => out.push(
                Conflict::new(Kind::UnknownTypeName, reference).with_arg(Arg::Name(r.name_text())),
            ),
        }
    }
}

fn boolean_condition(condition: &Node, ctx: &Context, out: &mut Vec<Conflict>) {
    let ty = type_of(condition, ctx);
    if !ty.is_vague() && !ty.is_boolean() {
        out.push(Conflict::new(Kind::ExpectedBooleanCondition, condition).with_arg(Arg::Type(ty)));
    }
}

fn boolean_query(query: &Node, ctx: &Context, out: &mut Vec<Conflict>) {
    let ty = type_of(query, ctx);
    if !ty.is_vague() && !ty.is_boolean() {
        out.push(Conflict::new(Kind::NonBooleanQuery, query).with_arg(Arg::Type(ty)));
    }
}

fn expect_stream(stream: &Node, ctx: &Context, out: &mut Vec<Conflict>) {
    let ty = type_of(stream, ctx);
    if !ty.is_vague() && ty.stream_item().is_none() {
        out.push(Conflict::new(Kind::ExpectedStream, stream).with_arg(Arg::Type(ty)));
    }
}

fn binary_rule(
    node: &Node,
    op: BinaryOp,
    left: &Node,
    right: &Node,
    ctx: &Context,
    out: &mut Vec<Conflict>,
) {
    let left_type = type_of(left, ctx);
    let right_type = type_of(right, ctx);
    if left_type.is_vague() || right_type.is_vague() || op.is_equality() {
        return;
    }
    let operand = |offender: &Node| {
        Conflict::new(Kind::IncompatibleOperand, offender)
            .with_secondary(node)
            .with_arg(Arg::Symbol(op.as_symbol()))
            .with_arg(Arg::Type(left_type.clone()))
            .with_arg(Arg::Type(right_type.clone()))
    };
    let units = || {
        Conflict::new(Kind::IncompatibleUnits, right)
            .with_secondary(left)
            .with_arg(Arg::Type(left_type.clone()))
            .with_arg(Arg::Type(right_type.clone()))
            .with_arg(Arg::Symbol(op.as_symbol()))
    };

    if op.is_logical() {
        if !left_type.is_boolean() {
            out.push(operand(left));
        } else if !right_type.is_boolean() {
            out.push(operand(right));
        }
        return;
    }
    if op == BinaryOp::Add && matches!(left_type, Type::Text) {
        if !matches!(right_type, Type::Text) {
            out.push(operand(right));
        }
        return;
    }
    let (Some(left_unit), Some(right_unit)) = (left_type.as_number(), right_type.as_number()) else {
        let offender = if left_type.as_number().is_none() { left } else { right };
        out.push(operand(offender));
        return;
    };
    let same_units_required = op.is_comparison()
        || matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Rem);
    let mismatched = match op {
        _ if same_units_required => left_unit != right_unit,
        BinaryOp::Pow => {
            !right_unit.is_unitless()
                || (literal_exponent(right).is_none() && !left_unit.is_unitless())
        }
        _ => false,
    };
    if mismatched {
        out.push(units());
    }
}

fn table_columns(table: &Node, row: &Node, ctx: &Context, out: &mut Vec<Conflict>) -> Option<Vec<Column>> {
    let ty = type_of(table, ctx);
    if let Some(columns) = ty.columns() {
        return Some(columns.to_vec());
    }
    if !ty.is_vague() {
        let symbol = row.first_token().map_or_else(String::new, |t| t.text.to_string());
        out.push(
            Conflict::new(Kind::IncompatibleOperand, table)
                .with_arg(Arg::Name(Name::new(&symbol)))
                .with_arg(Arg::Type(ty.clone()))
                .with_arg(Arg::Type(ty)),
        );
    }
    None
}

fn row_cells(row: &Node, columns: &[Column], ctx: &Context, out: &mut Vec<Conflict>) {
    let NodeKind::Row(cells) = row.kind() else {
        return;
    };
    for (index, cell) in cells.cells.iter().enumerate() {
        let Some(column) = columns.get(index) else {
            out.push(Conflict::new(Kind::ExtraCell, cell).with_arg(Arg::Count(columns.len())));
            continue;
        };
        cell_type(cell, column, ctx, out);
    }
    for column in columns.iter().skip(cells.cells.len()) {
        if column.has_default {
            continue;
        }
        let mut conflict = Conflict::new(Kind::MissingCell, row).with_arg(Arg::Name(column.name.clone()));
        if let Some(definition) = &column.definition {
            conflict = conflict.with_secondary(definition);
        }
        out.push(conflict);
    }
}

fn cell_type(cell: &Node, column: &Column, ctx: &Context, out: &mut Vec<Conflict>) {
    let given = type_of(cell, ctx);
    if incompatible(&column.ty, &given, ctx) {
        let mut conflict = Conflict::new(Kind::IncompatibleCell, cell)
            .with_arg(Arg::Type(column.ty.clone()))
            .with_arg(Arg::Type(given))
            .with_arg(Arg::Name(column.name.clone()));
        if let Some(definition) = &column.definition {
            conflict = conflict.with_secondary(definition);
        }
        out.push(conflict);
    }
}

fn update_cell(cell: &Node, columns: &[Column], ctx: &Context, out: &mut Vec<Conflict>) {
    let NodeKind::Bind(bind) = cell.kind() else {
        return;
    };
    let Some(name) = bind.primary_name() else {
        return;
    };
    match columns.iter().find(|c| c.name == name) {
        None => out.push(Conflict::new(Kind::UnknownColumn, cell).with_arg(Arg::Name(name))),
        Some(column) => {
            if let Some(value) = &bind.value {
                cell_type(value, column, ctx, out);
            }
        }
    }
}

fn borrows(program: &Node, ctx: &Context, out: &mut Vec<Conflict>) {
    let NodeKind::Program(p) = program.kind() else {
        return;
    };
    let current = ctx.project().source_of(program).map(|s| s.name.clone());
    for borrow in &p.borrows {
        let NodeKind::Borrow(b) = borrow.kind() else {
            continue;
        };
        let source_name = b.source_name();
        let Some(source) = ctx.project().source(source_name.as_str()) else {
            out.push(Conflict::new(Kind::UnknownBorrow, borrow).with_arg(Arg::Name(source_name)));
            continue;
        };
        if let Some(name) = b.name_text() {
            if source.export(name.as_str()).is_none() {
                let path = Name::new(&format!("{source_name}.{name}"));
                out.push(Conflict::new(Kind::UnknownBorrow, borrow).with_arg(Arg::Name(path)));
                continue;
            }
        }
        if let Some(current) = &current {
            if reaches(source_name.as_str(), current.as_str(), ctx) {
                out.push(Conflict::new(Kind::BorrowCycle, borrow).with_arg(Arg::Name(source_name)));
            }
        }
    }
}

/// Whether source `from` borrows `to`, directly or transitively.
fn reaches(from: &str, to: &str, ctx: &Context) -> bool {
    let mut seen = FxHashSet::default();
    let mut pending = vec![from.to_string()];
    while let Some(name) = pending.pop() {
        if name == to {
            return true;
        }
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(source) = ctx.project().source(&name) else {
            continue;
        };
        for borrow in source.borrows() {
            if let NodeKind::Borrow(b) = borrow.kind() {
                pending.push(b.source_name().as_str().to_string());
            }
        }
    }
    false
}
