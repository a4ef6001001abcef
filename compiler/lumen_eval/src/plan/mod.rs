//! Lowering syntax into step plans.
//!
//! Every expression evaluates as a flat list of [`Step`]s: a `Start` when
//! evaluation of the node begins, the steps of its children in source
//! order, its own native operation, and a `Finish`. Control flow is
//! explicit jumps with absolute targets. Keeping plans flat means the
//! interpreter never recurses through the tree, so it can pause after any
//! step, snapshot its frames, and step backward.
//!
//! Plans are pure functions of the tree, so the interpreter compiles each
//! one once and shares it between passes.

use std::fmt;

use lumen_ir::{BinaryOp, Name, Node, NodeId, NodeKind, UnaryOp};
use lumen_stack::ensure_sufficient_stack;
use lumen_types::{is_stream_position, split_number, Context};

use crate::errors::ExceptionKind;
use crate::Value;

/// One unit of evaluation.
#[derive(Clone, Debug)]
pub enum Step {
    /// Evaluation of `node` begins.
    Start(Node),
    /// Evaluation of `node` ends. Unless `node` sits where a stream is
    /// wanted, a stream on top of the stack becomes its latest value.
    Finish { node: Node, latest: bool },
    Jump { node: Node, target: usize },
    /// Pop a boolean; jump if it equals `when`.
    JumpIf { node: Node, when: bool, target: usize },
    /// Fail with an exception of `kind`.
    Halt { node: Node, kind: ExceptionKind },
    Native { node: Node, op: Op },
}

impl Step {
    pub fn node(&self) -> &Node {
        match self {
            Step::Start(node)
            | Step::Finish { node, .. }
            | Step::Jump { node, .. }
            | Step::JumpIf { node, .. }
            | Step::Halt { node, .. }
            | Step::Native { node, .. } => node,
        }
    }
}

/// Native operations. Operands come off the frame's value stack, last
/// pushed on top; the result is pushed back.
#[derive(Clone, Debug)]
pub enum Op {
    Constant(Value),
    Lookup(Name),
    /// `.` in a reaction's next expression (the reaction's id) or in a
    /// conversion body (`None`).
    This(Option<NodeId>),
    /// Bind the top value to every alias, leaving it on the stack.
    Bind(Vec<Name>),
    Discard,
    EnterScope,
    ExitScope,
    Borrow,
    Closure,
    Creator,
    RegisterConversion,
    List(usize),
    Set(usize),
    Map(usize),
    Table { columns: Vec<Name>, rows: usize },
    Insert(usize),
    Query,
    Property(Name),
    Call(usize),
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// Test against the type written at the node.
    Is(Node),
    Convert(Node),
    Previous(usize),
    Changed,
    /// Push whether the reaction has a value from an earlier pass.
    ReactionStarted,
    Retained,
    Remember,
    /// Push whether an input is bound in the innermost scope.
    IsBound(Name),
    Instance,
    UpdatedCells(usize),
    LoopNext,
    LoopBody,
    LoopAccept,
    LoopFinish,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Constant(value) => write!(f, "constant {value}"),
            Op::Lookup(name) => write!(f, "lookup {name}"),
            Op::This(_) => write!(f, "this"),
            Op::Bind(names) => {
                let names: Vec<&str> = names.iter().map(Name::as_str).collect();
                write!(f, "bind {}", names.join(","))
            }
            Op::Discard => write!(f, "discard"),
            Op::EnterScope => write!(f, "enter-scope"),
            Op::ExitScope => write!(f, "exit-scope"),
            Op::Borrow => write!(f, "borrow"),
            Op::Closure => write!(f, "closure"),
            Op::Creator => write!(f, "creator"),
            Op::RegisterConversion => write!(f, "register-conversion"),
            Op::List(n) => write!(f, "list {n}"),
            Op::Set(n) => write!(f, "set {n}"),
            Op::Map(n) => write!(f, "map {n}"),
            Op::Table { columns, rows } => write!(f, "table {}x{rows}", columns.len()),
            Op::Insert(n) => write!(f, "insert {n}"),
            Op::Query => write!(f, "query"),
            Op::Property(name) => write!(f, "property {name}"),
            Op::Call(n) => write!(f, "call {n}"),
            Op::Binary(op) => write!(f, "binary {}", op.as_symbol()),
            Op::Unary(op) => write!(f, "unary {}", op.as_symbol()),
            Op::Is(ty) => write!(f, "is {}", ty.print().trim()),
            Op::Convert(ty) => write!(f, "convert {}", ty.print().trim()),
            Op::Previous(offset) => write!(f, "previous {offset}"),
            Op::Changed => write!(f, "changed"),
            Op::ReactionStarted => write!(f, "reaction-started"),
            Op::Retained => write!(f, "retained"),
            Op::Remember => write!(f, "remember"),
            Op::IsBound(name) => write!(f, "is-bound {name}"),
            Op::Instance => write!(f, "instance"),
            Op::UpdatedCells(n) => write!(f, "updated-cells {n}"),
            Op::LoopNext => write!(f, "loop-next"),
            Op::LoopBody => write!(f, "loop-body"),
            Op::LoopAccept => write!(f, "loop-accept"),
            Op::LoopFinish => write!(f, "loop-finish"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Start(node) => write!(f, "start {}", node.label()),
            Step::Finish { node, latest } => {
                write!(f, "finish {}", node.label())?;
                if *latest {
                    write!(f, " latest")?;
                }
                Ok(())
            }
            Step::Jump { target, .. } => write!(f, "jump {target}"),
            Step::JumpIf { when, target, .. } => {
                write!(f, "jump-if {} {target}", if *when { "⊤" } else { "⊥" })
            }
            Step::Halt { kind, .. } => write!(f, "halt {kind}"),
            Step::Native { op, .. } => write!(f, "{op}"),
        }
    }
}

/// What a plan evaluates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlanKind {
    /// An expression or a whole program.
    Expression,
    /// A function body behind its input defaults.
    Function,
    /// A structure body, ending in the new instance.
    Structure,
    Conversion,
    /// One row of a table query.
    Row,
    /// The driver of a higher-order member or table query.
    Loop,
}

#[derive(Clone, Debug)]
pub struct Plan {
    pub root: Node,
    pub kind: PlanKind,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            let source = step.node().print();
            let source = source.trim();
            let source: String = source.chars().take(40).collect();
            writeln!(f, "{index:>4}  {:<28} {source}", step.to_string())?;
        }
        Ok(())
    }
}

/// Compile the plan of `kind` rooted at `node`.
pub fn compile(node: &Node, kind: PlanKind, ctx: &Context) -> Plan {
    let mut lowering = Lowering {
        ctx,
        steps: Vec::new(),
    };
    match kind {
        PlanKind::Expression => lowering.expression(node),
        PlanKind::Function => lowering.function(node),
        PlanKind::Structure => lowering.structure(node),
        PlanKind::Conversion => lowering.conversion(node),
        PlanKind::Row => lowering.row(node),
        PlanKind::Loop => lowering.driver(node),
    }
    Plan {
        root: node.clone(),
        kind,
        steps: lowering.steps,
    }
}

struct Lowering<'a> {
    ctx: &'a Context,
    steps: Vec<Step>,
}

impl Lowering<'_> {
    fn next(&self) -> usize {
        self.steps.len()
    }

    fn native(&mut self, node: &Node, op: Op) {
        self.steps.push(Step::Native {
            node: node.clone(),
            op,
        });
    }

    fn halt(&mut self, node: &Node, kind: ExceptionKind) {
        self.steps.push(Step::Halt {
            node: node.clone(),
            kind,
        });
    }

    /// Emit a jump with a target patched later by [`Lowering::land`].
    fn jump(&mut self, node: &Node) -> usize {
        self.steps.push(Step::Jump {
            node: node.clone(),
            target: usize::MAX,
        });
        self.next() - 1
    }

    fn jump_if(&mut self, node: &Node, when: bool) -> usize {
        self.steps.push(Step::JumpIf {
            node: node.clone(),
            when,
            target: usize::MAX,
        });
        self.next() - 1
    }

    /// Point the jump at `at` to the next step.
    fn land(&mut self, at: usize) {
        let next = self.next();
        if let Some(Step::Jump { target, .. } | Step::JumpIf { target, .. }) = self.steps.get_mut(at)
        {
            *target = next;
        }
    }

    fn expression(&mut self, node: &Node) {
        ensure_sufficient_stack(|| {
            if node.as_token().is_some() {
                self.halt(node, ExceptionKind::Unparsable);
                return;
            }
            if let NodeKind::Documented(documented) = node.kind() {
                self.expression(&documented.expression);
                return;
            }
            self.steps.push(Step::Start(node.clone()));
            self.lower(node);
            self.steps.push(Step::Finish {
                node: node.clone(),
                latest: !is_stream_position(node, self.ctx),
            });
        });
    }

    fn lower(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::Program(program) => {
                for borrow in &program.borrows {
                    self.native(borrow, Op::Borrow);
                }
                match program.block.kind() {
                    NodeKind::Block(block) => self.statements(node, &block.statements),
                    _ => self.native(node, Op::Constant(Value::None)),
                }
            }
            NodeKind::Block(block) => {
                if block.open.is_none() {
                    self.statements(node, &block.statements);
                } else if block.statements.is_empty() {
                    self.halt(node, ExceptionKind::ValueExpected);
                } else {
                    self.native(node, Op::EnterScope);
                    self.statements(node, &block.statements);
                    self.native(node, Op::ExitScope);
                }
            }
            NodeKind::Bind(bind) => match &bind.value {
                Some(value) => {
                    self.expression(value);
                    self.native(node, Op::Bind(bind.aliases()));
                }
                None => self.halt(node, ExceptionKind::ValueExpected),
            },
            NodeKind::BooleanLiteral(literal) => {
                let value = Value::Boolean(literal.value.text() == "⊤");
                self.native(node, Op::Constant(value));
            }
            NodeKind::NumberLiteral(literal) => {
                match split_number(literal.number.text()) {
                    Some((magnitude, unit)) => {
                        self.native(node, Op::Constant(Value::number(magnitude, unit)));
                    }
                    None => self.halt(node, ExceptionKind::TypeMismatch),
                }
            }
            NodeKind::TextLiteral(literal) => {
                let text = literal.text.text();
                let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
                self.native(node, Op::Constant(Value::text(inner)));
            }
            NodeKind::NoneLiteral(_) => self.native(node, Op::Constant(Value::None)),
            NodeKind::ListLiteral(list) => {
                for item in &list.items {
                    self.expression(item);
                }
                self.native(node, Op::List(list.items.len()));
            }
            NodeKind::SetLiteral(set) => {
                for item in &set.items {
                    self.expression(item);
                }
                self.native(node, Op::Set(set.items.len()));
            }
            NodeKind::MapLiteral(map) => {
                let mut count = 0;
                for entry in &map.entries {
                    if let NodeKind::KeyValue(pair) = entry.kind() {
                        self.expression(&pair.key);
                        self.expression(&pair.value);
                        count += 1;
                    }
                }
                self.native(node, Op::Map(count));
            }
            NodeKind::KeyValue(pair) => self.expression(&pair.value),
            NodeKind::TableLiteral(table) => self.table(node, table),
            NodeKind::Reference(reference) => {
                self.native(node, Op::Lookup(reference.name_text()));
            }
            NodeKind::This(_) => {
                let op = Op::This(self.enclosing_reaction(node));
                self.native(node, op);
            }
            NodeKind::PropertyReference(property) => {
                self.expression(&property.structure);
                match property.name_text() {
                    Some(name) => self.native(node, Op::Property(name)),
                    None => self.halt(node, ExceptionKind::Unparsable),
                }
            }
            NodeKind::Evaluate(evaluate) => {
                self.expression(&evaluate.function);
                for input in &evaluate.inputs {
                    self.expression(input);
                }
                self.native(node, Op::Call(evaluate.inputs.len()));
            }
            NodeKind::FunctionDefinition(function) => {
                self.native(node, Op::Closure);
                if let Some(name) = function.name_text() {
                    self.native(node, Op::Bind(vec![name]));
                }
            }
            NodeKind::StructureDefinition(structure) => {
                self.native(node, Op::Creator);
                if let Some(name) = structure.name_text() {
                    self.native(node, Op::Bind(vec![name]));
                }
            }
            NodeKind::ConversionDefinition(_) => self.native(node, Op::RegisterConversion),
            NodeKind::BinaryOperation(operation) => {
                self.expression(&operation.left);
                self.expression(&operation.right);
                match BinaryOp::from_symbol(operation.operator.text()) {
                    Some(op) => self.native(node, Op::Binary(op)),
                    None => self.halt(node, ExceptionKind::Unparsable),
                }
            }
            NodeKind::UnaryOperation(operation) => {
                self.expression(&operation.operand);
                match UnaryOp::from_symbol(operation.operator.text()) {
                    Some(op) => self.native(node, Op::Unary(op)),
                    None => self.halt(node, ExceptionKind::Unparsable),
                }
            }
            NodeKind::Conditional(conditional) => {
                self.expression(&conditional.condition);
                let otherwise = self.jump_if(node, false);
                self.expression(&conditional.yes);
                let end = self.jump(node);
                self.land(otherwise);
                self.expression(&conditional.no);
                self.land(end);
            }
            NodeKind::Is(is) => {
                self.expression(&is.expression);
                self.native(node, Op::Is(is.ty.clone()));
            }
            NodeKind::Convert(convert) => {
                self.expression(&convert.expression);
                self.native(node, Op::Convert(convert.ty.clone()));
            }
            NodeKind::Previous(previous) => {
                self.expression(&previous.stream);
                let offset = previous
                    .offset
                    .as_ref()
                    .and_then(|token| token.text().parse::<usize>().ok())
                    .unwrap_or(1);
                self.native(node, Op::Previous(offset));
            }
            NodeKind::Changed(changed) => {
                self.expression(&changed.stream);
                self.native(node, Op::Changed);
            }
            NodeKind::Reaction(reaction) => {
                self.native(node, Op::ReactionStarted);
                let started = self.jump_if(node, true);
                self.expression(&reaction.initial);
                let initialized = self.jump(node);
                self.land(started);
                self.expression(&reaction.condition);
                let keep = self.jump_if(node, false);
                self.expression(&reaction.next);
                let advanced = self.jump(node);
                self.land(keep);
                self.native(node, Op::Retained);
                self.land(initialized);
                self.land(advanced);
                self.native(node, Op::Remember);
            }
            NodeKind::Select(query) => {
                self.expression(&query.table);
                self.native(node, Op::Query);
            }
            NodeKind::Update(query) => {
                self.expression(&query.table);
                self.native(node, Op::Query);
            }
            NodeKind::Delete(query) => {
                self.expression(&query.table);
                self.native(node, Op::Query);
            }
            NodeKind::Insert(insert) => {
                self.expression(&insert.table);
                let cells = match insert.row.kind() {
                    NodeKind::Row(row) => row.cells.clone(),
                    _ => Vec::new(),
                };
                for cell in &cells {
                    self.expression(cell);
                }
                self.native(node, Op::Insert(cells.len()));
            }
            NodeKind::ExpressionPlaceholder(_) => self.halt(node, ExceptionKind::Placeholder),
            _ => self.halt(node, ExceptionKind::Unparsable),
        }
    }

    /// Statements of a block; every value but the last is discarded.
    fn statements(&mut self, node: &Node, statements: &[Node]) {
        if statements.is_empty() {
            self.native(node, Op::Constant(Value::None));
            return;
        }
        for (index, statement) in statements.iter().enumerate() {
            if index > 0 {
                self.native(statement, Op::Discard);
            }
            self.expression(statement);
        }
    }

    fn table(&mut self, node: &Node, table: &lumen_ir::TableLiteral) {
        let header: Vec<Node> = match table.header.kind() {
            NodeKind::Row(row) => row.cells.clone(),
            _ => Vec::new(),
        };
        let columns: Vec<Name> = header
            .iter()
            .map(|cell| match cell.kind() {
                NodeKind::Bind(bind) => bind.primary_name().unwrap_or_else(|| Name::new("_")),
                _ => Name::new("_"),
            })
            .collect();
        for row in &table.rows {
            let cells = match row.kind() {
                NodeKind::Row(row) => row.cells.clone(),
                _ => Vec::new(),
            };
            for (index, column) in header.iter().enumerate() {
                let default = match column.kind() {
                    NodeKind::Bind(bind) => bind.value.clone(),
                    _ => None,
                };
                match (cells.get(index), default) {
                    (Some(cell), _) => self.expression(cell),
                    (None, Some(default)) => self.expression(&default),
                    (None, None) => self.halt(row, ExceptionKind::ValueExpected),
                }
            }
        }
        self.native(
            node,
            Op::Table {
                columns,
                rows: table.rows.len(),
            },
        );
    }

    /// The reaction whose next expression contains `node`, if the nearest
    /// owner of `.` is a reaction rather than a conversion.
    fn enclosing_reaction(&self, node: &Node) -> Option<NodeId> {
        let mut child = node.clone();
        for ancestor in self.ctx.ancestors(node) {
            match ancestor.kind() {
                NodeKind::Reaction(reaction) if reaction.next.same(&child) => {
                    return Some(ancestor.id());
                }
                NodeKind::ConversionDefinition(_) => return None,
                _ => {}
            }
            child = ancestor;
        }
        None
    }

    /// Fill unbound defaulted inputs, then evaluate the body.
    fn defaults(&mut self, inputs: &[Node]) {
        for input in inputs {
            let NodeKind::Bind(bind) = input.kind() else {
                continue;
            };
            let (Some(name), Some(value)) = (bind.primary_name(), &bind.value) else {
                continue;
            };
            self.native(input, Op::IsBound(name));
            let bound = self.jump_if(input, true);
            self.expression(value);
            self.native(input, Op::Bind(bind.aliases()));
            self.native(input, Op::Discard);
            self.land(bound);
        }
    }

    fn function(&mut self, node: &Node) {
        let NodeKind::FunctionDefinition(function) = node.kind() else {
            self.halt(node, ExceptionKind::NotAFunction);
            return;
        };
        self.defaults(&function.inputs);
        match &function.body {
            Some(body) => self.expression(body),
            None => self.halt(node, ExceptionKind::ValueExpected),
        }
    }

    /// Body statements run in the instance scope itself, so their binds
    /// become properties.
    fn structure(&mut self, node: &Node) {
        let NodeKind::StructureDefinition(structure) = node.kind() else {
            self.halt(node, ExceptionKind::NotAFunction);
            return;
        };
        self.defaults(&structure.inputs);
        if let Some(NodeKind::Block(body)) = structure.body.as_ref().map(Node::kind) {
            for statement in &body.statements {
                self.expression(statement);
                self.native(statement, Op::Discard);
            }
        }
        self.native(node, Op::Instance);
    }

    fn conversion(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::ConversionDefinition(conversion) => self.expression(&conversion.body),
            _ => self.halt(node, ExceptionKind::MissingConversion),
        }
    }

    /// Evaluate one row of a query in a scope binding its columns. An
    /// update pushes its new cells when the query holds and `ø` otherwise.
    fn row(&mut self, node: &Node) {
        match node.kind() {
            NodeKind::Select(lumen_ir::Select { query, .. })
            | NodeKind::Delete(lumen_ir::Delete { query, .. }) => self.expression(query),
            NodeKind::Update(update) => {
                self.expression(&update.query);
                let unchanged = self.jump_if(node, false);
                let cells = match update.row.kind() {
                    NodeKind::Row(row) => row.cells.clone(),
                    _ => Vec::new(),
                };
                let mut count = 0;
                for cell in &cells {
                    if let NodeKind::Bind(lumen_ir::Bind {
                        value: Some(value), ..
                    }) = cell.kind()
                    {
                        self.expression(value);
                        count += 1;
                    }
                }
                self.native(node, Op::UpdatedCells(count));
                let end = self.jump(node);
                self.land(unchanged);
                self.native(node, Op::Constant(Value::None));
                self.land(end);
            }
            _ => self.halt(node, ExceptionKind::Unparsable),
        }
    }

    fn driver(&mut self, node: &Node) {
        let top = self.next();
        self.native(node, Op::LoopNext);
        let finish = self.jump_if(node, false);
        self.native(node, Op::LoopBody);
        self.native(node, Op::LoopAccept);
        self.steps.push(Step::Jump {
            node: node.clone(),
            target: top,
        });
        self.land(finish);
        self.native(node, Op::LoopFinish);
    }
}

#[cfg(test)]
mod tests;
