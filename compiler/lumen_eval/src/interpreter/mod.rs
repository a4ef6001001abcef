//! The stepped evaluator.
//!
//! An [`Evaluator`] runs a project one [`Step`] at a time on an explicit
//! stack of frames. Each frame executes one [`Plan`] with its own value
//! stack and scope chain; calls, conversions, borrowed sources and loops
//! push frames instead of recursing, so evaluation can stop after any step.
//!
//! # Passes
//!
//! One run of the main program is a pass. [`Evaluator::tick`] drains the
//! stream queue into the histories and starts the next pass. Reactions keep
//! their values between passes; everything else is recomputed.
//!
//! # Stepping backward
//!
//! Before each step the frame stack is snapshotted. Frames clone cheaply
//! (values are `Arc`-shared), but binds write into shared scopes, so
//! every mutation outside the frames goes into a journal and
//! [`Evaluator::step_back`] undoes journal entries newer than the snapshot.

mod builder;

use std::collections::VecDeque;
use std::sync::Arc;

use lumen_ir::{Name, Node, NodeId, NodeKind};
use lumen_types::{
    find_conversion, raw_type, BuiltinMember, Context, Conversion, Project, Receiver, StreamKind,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::environment::Scope;
use crate::errors::{
    arity_mismatch, call_depth_limit, missing_conversion, missing_input, not_a_function,
    placeholder, step_limit, type_mismatch, unit_overflow, unknown_name, unknown_property,
    unparsable, value_expected, EvalResult, Exception, ExceptionKind, ProduceError,
};
use crate::methods;
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::plan::{compile, Op, Plan, PlanKind, Step};
use crate::streams::{StreamRegistry, StreamSender};
use crate::value::{BoundMember, Closure, FunctionValue, StructureValue, TableValue};
use crate::Value;

pub use builder::{EvalConfig, EvaluatorBuilder};

/// Where an evaluator is in its current pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// No pass started yet.
    Idle,
    /// Inside [`Evaluator::play`].
    Running,
    /// Paused between steps.
    Stepping,
    Done,
    /// The pass ended in an exception.
    Exception,
}

/// What happens to a frame's value when its plan ends.
#[derive(Clone, Debug)]
enum FrameExit {
    /// The pass result.
    Root,
    /// Pushed onto the caller's value stack.
    Return,
    /// A borrowed source finished; import from its scope.
    Borrow { borrow: Node, source: Name },
}

#[derive(Clone, Debug)]
enum LoopKind {
    Member {
        member: BuiltinMember,
        function: Value,
    },
    /// Projected columns; empty keeps all of them.
    Select(Vec<Name>),
    /// Columns the update row assigns, in row order.
    Update(Vec<Name>),
    Delete,
}

/// Progress of a higher-order member or table query.
#[derive(Clone, Debug)]
struct LoopState {
    kind: LoopKind,
    items: Arc<[Value]>,
    table: Option<Arc<TableValue>>,
    index: usize,
    done: bool,
    results: Vec<Value>,
    rows: Vec<Arc<[Value]>>,
    accumulator: Value,
}

impl LoopState {
    fn new(kind: LoopKind, items: Arc<[Value]>, accumulator: Value) -> Self {
        LoopState {
            kind,
            items,
            table: None,
            index: 0,
            done: false,
            results: Vec::new(),
            rows: Vec::new(),
            accumulator,
        }
    }

    fn query(kind: LoopKind, table: Arc<TableValue>) -> Self {
        LoopState {
            table: Some(table),
            ..LoopState::new(kind, Arc::from(Vec::new()), Value::None)
        }
    }

    fn len(&self) -> usize {
        match &self.table {
            Some(table) => table.rows.len(),
            None => self.items.len(),
        }
    }

    fn row(&self, index: usize) -> Option<Arc<[Value]>> {
        self.table.as_ref()?.rows.get(index).cloned()
    }
}

#[derive(Clone, Debug)]
struct Frame {
    plan: Arc<Plan>,
    pc: usize,
    values: Vec<Value>,
    /// Scope the frame was entered with.
    base: Scope,
    /// Scopes of parenthesized blocks, innermost last.
    blocks: Vec<Scope>,
    /// Input of the conversion this frame evaluates.
    this: Option<Value>,
    /// Conversions defined by statements evaluated in this frame.
    conversions: SmallVec<[(Node, Scope); 2]>,
    looping: Option<Box<LoopState>>,
    exit: FrameExit,
}

impl Frame {
    fn new(plan: Arc<Plan>, base: Scope, exit: FrameExit) -> Self {
        Frame {
            plan,
            pc: 0,
            values: Vec::new(),
            base,
            blocks: Vec::new(),
            this: None,
            conversions: SmallVec::new(),
            looping: None,
            exit,
        }
    }

    fn scope(&self) -> &Scope {
        self.blocks.last().unwrap_or(&self.base)
    }

    fn is_finished(&self) -> bool {
        self.pc >= self.plan.steps.len()
    }
}

#[derive(Clone, Debug)]
enum SourceState {
    Evaluating,
    Done(Scope),
}

/// A mutation outside the frame stack, recorded so it can be undone.
#[derive(Clone, Debug)]
enum Journal {
    Bind {
        scope: Scope,
        name: Name,
        previous: Option<Value>,
    },
    Reaction {
        id: NodeId,
        previous: Option<Value>,
    },
    Source {
        name: Name,
        previous: Option<SourceState>,
    },
}

#[derive(Clone, Debug)]
struct Snapshot {
    frames: Vec<Frame>,
    journal_len: usize,
    steps_taken: usize,
}

/// Evaluates a project's main program, one step at a time if asked.
pub struct Evaluator {
    config: EvalConfig,
    ctx: Context,
    plans: FxHashMap<(NodeId, PlanKind), Arc<Plan>>,
    frames: Vec<Frame>,
    state: State,
    result: Option<Value>,
    steps_taken: usize,
    history: VecDeque<Snapshot>,
    journal: Vec<Journal>,
    sources: FxHashMap<Name, SourceState>,
    reactions: FxHashMap<NodeId, Value>,
    streams: StreamRegistry,
    sender: StreamSender,
    pass: u64,
}

impl Evaluator {
    /// Evaluator with default limits.
    pub fn new(project: impl Into<Arc<Project>>) -> Self {
        EvaluatorBuilder::new(project).build()
    }

    pub fn builder(project: impl Into<Arc<Project>>) -> EvaluatorBuilder {
        EvaluatorBuilder::new(project)
    }

    fn from_parts(config: EvalConfig, project: Arc<Project>, streams: StreamRegistry) -> Self {
        Evaluator {
            config,
            ctx: Context::for_project(project),
            plans: FxHashMap::default(),
            frames: Vec::new(),
            state: State::Idle,
            result: None,
            steps_taken: 0,
            history: VecDeque::new(),
            journal: Vec::new(),
            sources: FxHashMap::default(),
            reactions: FxHashMap::default(),
            streams,
            sender: StreamSender::default(),
            pass: 0,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of passes started so far.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done | State::Exception)
    }

    /// The pass result once done, otherwise the value most recently
    /// produced by the executing frame.
    pub fn current_value(&self) -> Option<&Value> {
        if let Some(result) = &self.result {
            return Some(result);
        }
        self.frames.last().and_then(|frame| frame.values.last())
    }

    /// The step that will execute next.
    pub fn current_step(&self) -> Option<&Step> {
        let frame = self.frames.last()?;
        frame.plan.steps.get(frame.pc)
    }

    pub fn exception(&self) -> Option<&Exception> {
        self.result.as_ref().and_then(Value::as_exception)
    }

    /// Handle for queueing stream values from any thread.
    pub fn sender(&self) -> StreamSender {
        self.sender.clone()
    }

    /// Queue a value for the stream named `stream`.
    pub fn produce(&self, stream: &str, value: Value) -> Result<(), ProduceError> {
        self.sender.produce(stream, value)
    }

    pub fn stream_history(&self, kind: StreamKind) -> Vec<Value> {
        self.streams.history(kind)
    }

    /// The plan of `kind` for `node`, compiled on first use.
    pub fn plan(&mut self, node: &Node, kind: PlanKind) -> Arc<Plan> {
        let ctx = &self.ctx;
        Arc::clone(
            self.plans
                .entry((node.id(), kind))
                .or_insert_with(|| Arc::new(compile(node, kind, ctx))),
        )
    }

    /// Begin a new pass over the main program, abandoning any pass in
    /// progress.
    pub fn start(&mut self) {
        self.pass += 1;
        tracing::debug!(pass = self.pass, "starting pass");
        self.frames.clear();
        self.history.clear();
        self.journal.clear();
        self.sources.clear();
        self.result = None;
        self.steps_taken = 0;
        let program = self.ctx.program().clone();
        let plan = self.plan(&program, PlanKind::Expression);
        self.frames
            .push(Frame::new(plan, Scope::root(), FrameExit::Root));
        self.state = State::Stepping;
    }

    /// Execute one step. Does nothing unless a pass is in progress.
    pub fn step(&mut self) -> State {
        if !matches!(self.state, State::Stepping | State::Running) {
            return self.state;
        }
        if self.steps_taken >= self.config.max_steps {
            self.fail(step_limit(self.config.max_steps));
            return self.state;
        }
        if self.config.history_limit > 0 {
            if self.history.len() >= self.config.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(Snapshot {
                frames: self.frames.clone(),
                journal_len: self.journal.len(),
                steps_taken: self.steps_taken,
            });
        }
        self.steps_taken += 1;
        match self.execute() {
            Ok(()) if self.frames.is_empty() => self.state = State::Done,
            Ok(()) => {}
            Err(exception) => self.fail(exception),
        }
        self.state
    }

    /// Undo the most recent step. Returns `false` if there is none.
    pub fn step_back(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_back() else {
            return false;
        };
        while self.journal.len() > snapshot.journal_len {
            match self.journal.pop() {
                Some(Journal::Bind {
                    scope,
                    name,
                    previous,
                }) => scope.undefine(&name, previous),
                Some(Journal::Reaction { id, previous }) => match previous {
                    Some(value) => {
                        self.reactions.insert(id, value);
                    }
                    None => {
                        self.reactions.remove(&id);
                    }
                },
                Some(Journal::Source { name, previous }) => match previous {
                    Some(state) => {
                        self.sources.insert(name, state);
                    }
                    None => {
                        self.sources.remove(&name);
                    }
                },
                None => break,
            }
        }
        self.frames = snapshot.frames;
        self.steps_taken = snapshot.steps_taken;
        self.result = None;
        self.state = State::Stepping;
        true
    }

    /// Run the current pass to completion, starting one if idle.
    pub fn play(&mut self) -> Value {
        if self.state == State::Idle {
            self.start();
        }
        if self.state == State::Stepping {
            self.state = State::Running;
        }
        while self.state == State::Running {
            self.step();
        }
        tracing::debug!(pass = self.pass, steps = self.steps_taken, state = ?self.state, "pass ended");
        self.result.clone().unwrap_or(Value::None)
    }

    /// Start a fresh pass and run it to completion.
    pub fn run(&mut self) -> Value {
        self.start();
        self.play()
    }

    /// Move queued stream values into their histories and re-evaluate
    /// once. Returns `None` when nothing was queued.
    #[tracing::instrument(level = "debug", skip(self), fields(pass = self.pass))]
    pub fn tick(&mut self) -> Option<Value> {
        let queued = self.sender.drain();
        if queued.is_empty() {
            return None;
        }
        let next = self.pass + 1;
        for (kind, value) in queued {
            self.streams.push(kind, value, next);
        }
        Some(self.run())
    }

    fn fail(&mut self, exception: Exception) {
        tracing::debug!(%exception, "pass raised an exception");
        self.frames.clear();
        self.result = Some(Value::exception(exception));
        self.state = State::Exception;
    }

    // Frame and value stack access

    fn top(&mut self) -> EvalResult<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))
    }

    fn scope(&self) -> Scope {
        self.frames
            .last()
            .map_or_else(Scope::root, |frame| frame.scope().clone())
    }

    fn push(&mut self, value: Value) -> EvalResult<()> {
        self.top()?.values.push(value);
        Ok(())
    }

    fn pop(&mut self) -> EvalResult<Value> {
        self.top()?
            .values
            .pop()
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))
    }

    fn peek(&mut self) -> EvalResult<Value> {
        self.top()?
            .values
            .last()
            .cloned()
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))
    }

    /// Pop `count` values, returned in the order they were pushed.
    fn pop_n(&mut self, count: usize) -> EvalResult<Vec<Value>> {
        let values = &mut self.top()?.values;
        let split = values
            .len()
            .checked_sub(count)
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))?;
        Ok(values.split_off(split))
    }

    fn push_frame(&mut self, frame: Frame, node: &Node) -> EvalResult<()> {
        if self.frames.len() >= self.config.max_depth {
            return Err(call_depth_limit(self.config.max_depth, node));
        }
        self.frames.push(frame);
        Ok(())
    }

    fn define(&mut self, scope: &Scope, name: Name, value: Value) {
        let previous = scope.define(name.clone(), value);
        self.journal.push(Journal::Bind {
            scope: scope.clone(),
            name,
            previous,
        });
    }

    fn set_source(&mut self, name: Name, state: SourceState) {
        let previous = self.sources.insert(name.clone(), state);
        self.journal.push(Journal::Source { name, previous });
    }

    // Execution

    fn execute(&mut self) -> EvalResult<()> {
        let frame = self.top()?;
        let plan = Arc::clone(&frame.plan);
        let Some(step) = plan.steps.get(frame.pc) else {
            return self.complete_frames();
        };
        frame.pc += 1;
        self.execute_step(step)
            .map_err(|exception| exception.at(step.node()))?;
        self.complete_frames()
    }

    fn execute_step(&mut self, step: &Step) -> EvalResult<()> {
        match step {
            Step::Start(_) => Ok(()),
            Step::Finish { latest, .. } => {
                if !*latest {
                    return Ok(());
                }
                let stream = match self.top()?.values.last() {
                    Some(Value::Stream(kind)) => *kind,
                    _ => return Ok(()),
                };
                let value = self.streams.latest(stream);
                if let Some(top) = self.top()?.values.last_mut() {
                    *top = value;
                }
                Ok(())
            }
            Step::Jump { target, .. } => {
                self.top()?.pc = *target;
                Ok(())
            }
            Step::JumpIf { when, target, .. } => {
                let value = self.pop()?;
                let condition = value
                    .as_bool()
                    .ok_or_else(|| type_mismatch("?", value.type_label()))?;
                if condition == *when {
                    self.top()?.pc = *target;
                }
                Ok(())
            }
            Step::Halt { node, kind } => Err(match kind {
                ExceptionKind::Placeholder => placeholder(node),
                ExceptionKind::Unparsable => unparsable(node),
                ExceptionKind::ValueExpected => value_expected(node),
                ExceptionKind::TypeMismatch => unit_overflow(node),
                kind => Exception::new(*kind, Some(node)),
            }),
            Step::Native { node, op } => self.native(node, op),
        }
    }

    /// Pop every frame whose plan has ended, delivering its value.
    fn complete_frames(&mut self) -> EvalResult<()> {
        while self.frames.last().is_some_and(Frame::is_finished) {
            let Some(mut frame) = self.frames.pop() else {
                break;
            };
            let value = frame.values.pop().unwrap_or(Value::None);
            match frame.exit {
                FrameExit::Root => self.result = Some(value),
                FrameExit::Return => self.push(value)?,
                FrameExit::Borrow { borrow, source } => {
                    self.set_source(source, SourceState::Done(frame.base.clone()));
                    self.import(&borrow, &frame.base);
                }
            }
        }
        Ok(())
    }

    fn native(&mut self, node: &Node, op: &Op) -> EvalResult<()> {
        match op {
            Op::Constant(value) => self.push(value.clone()),
            Op::Lookup(name) => {
                let value = self
                    .scope()
                    .lookup(name)
                    .or_else(|| {
                        StreamKind::from_name(name)
                            .map(|kind| Value::Function(FunctionValue::Stream(kind)))
                    })
                    .ok_or_else(|| unknown_name(name, node))?;
                self.push(value)
            }
            Op::This(Some(reaction)) => {
                let value = self
                    .reactions
                    .get(reaction)
                    .cloned()
                    .ok_or_else(|| value_expected(node))?;
                self.push(value)
            }
            Op::This(None) => {
                let value = self
                    .frames
                    .iter()
                    .rev()
                    .find_map(|frame| frame.this.clone())
                    .ok_or_else(|| unknown_name(&Name::new("."), node))?;
                self.push(value)
            }
            Op::Bind(names) => {
                let value = self.peek()?;
                let scope = self.scope();
                for name in names {
                    self.define(&scope, name.clone(), value.clone());
                }
                Ok(())
            }
            Op::Discard => self.pop().map(drop),
            Op::EnterScope => {
                let frame = self.top()?;
                let block = frame.scope().child();
                frame.blocks.push(block);
                Ok(())
            }
            Op::ExitScope => {
                self.top()?.blocks.pop();
                Ok(())
            }
            Op::Borrow => self.borrow(node),
            Op::Closure => {
                let closure = Arc::new(Closure {
                    definition: node.clone(),
                    scope: self.scope(),
                });
                self.push(Value::Function(FunctionValue::Closure(closure)))
            }
            Op::Creator => {
                let closure = Arc::new(Closure {
                    definition: node.clone(),
                    scope: self.scope(),
                });
                self.push(Value::Function(FunctionValue::Creator(closure)))
            }
            Op::RegisterConversion => {
                let scope = self.scope();
                self.top()?.conversions.push((node.clone(), scope));
                self.push(Value::None)
            }
            Op::List(count) => {
                let items = self.pop_n(*count)?;
                self.push(Value::list(items))
            }
            Op::Set(count) => {
                let items = self.pop_n(*count)?;
                self.push(Value::set(items))
            }
            Op::Map(count) => {
                let flat = self.pop_n(count * 2)?;
                let pairs = flat
                    .chunks_exact(2)
                    .filter_map(|pair| match pair {
                        [key, value] => Some((key.clone(), value.clone())),
                        _ => None,
                    })
                    .collect();
                self.push(Value::map(pairs))
            }
            Op::Table { columns, rows } => {
                let cells = self.pop_n(columns.len() * rows)?;
                let rows = if columns.is_empty() {
                    vec![Vec::new(); *rows]
                } else {
                    cells.chunks(columns.len()).map(<[Value]>::to_vec).collect()
                };
                let table = methods::table(columns.clone(), rows)?;
                self.push(table)
            }
            Op::Insert(count) => {
                let cells = self.pop_n(*count)?;
                let table = self.pop()?;
                let Value::Table(table) = table else {
                    return Err(type_mismatch("⎡⎦", table.type_label()));
                };
                let mut rows: Vec<Vec<Value>> = table.rows.iter().map(|row| row.to_vec()).collect();
                rows.push(cells);
                let table = methods::table(table.columns.clone(), rows)?;
                self.push(table)
            }
            Op::Query => self.query(node),
            Op::Property(name) => {
                let receiver = self.pop()?;
                let value = property(receiver, name, node)?;
                self.push(value)
            }
            Op::Call(count) => {
                let inputs = self.pop_n(*count)?;
                let callee = self.pop()?;
                self.call(callee, inputs, node)
            }
            Op::Binary(op) => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.push(evaluate_binary(*op, &left, &right)?)
            }
            Op::Unary(op) => {
                let operand = self.pop()?;
                self.push(evaluate_unary(*op, &operand)?)
            }
            Op::Is(ty) => {
                let value = self.pop()?;
                let expected = raw_type(ty, &self.ctx);
                let is = expected.accepts(&value.runtime_type(&self.ctx), &self.ctx);
                self.push(Value::Boolean(is))
            }
            Op::Convert(ty) => self.convert(node, ty),
            Op::Previous(offset) => match self.pop()? {
                Value::Stream(kind) => {
                    let value = self.streams.previous(kind, *offset).unwrap_or(Value::None);
                    self.push(value)
                }
                other => Err(type_mismatch("…", other.type_label())),
            },
            Op::Changed => match self.pop()? {
                Value::Stream(kind) => {
                    let changed = self.streams.changed(kind, self.pass);
                    self.push(Value::Boolean(changed))
                }
                other => Err(type_mismatch("…", other.type_label())),
            },
            Op::ReactionStarted => {
                let started = self.reactions.contains_key(&node.id());
                self.push(Value::Boolean(started))
            }
            Op::Retained => {
                let value = self
                    .reactions
                    .get(&node.id())
                    .cloned()
                    .ok_or_else(|| value_expected(node))?;
                self.push(value)
            }
            Op::Remember => {
                let value = self.peek()?;
                let id = node.id();
                let previous = self.reactions.insert(id, value);
                self.journal.push(Journal::Reaction { id, previous });
                Ok(())
            }
            Op::IsBound(name) => {
                let bound = self.scope().is_bound_here(name);
                self.push(Value::Boolean(bound))
            }
            Op::Instance => {
                let name = match node.kind() {
                    NodeKind::StructureDefinition(structure) => structure.name_text(),
                    _ => None,
                };
                let scope = self.top()?.base.clone();
                let instance = StructureValue {
                    name: name.unwrap_or_else(|| Name::new("•")),
                    definition: node.clone(),
                    scope,
                };
                self.push(Value::Structure(Arc::new(instance)))
            }
            Op::UpdatedCells(count) => {
                let cells = self.pop_n(*count)?;
                self.push(Value::list(cells))
            }
            Op::LoopNext => {
                let state = self.looping()?;
                let more = !state.done && state.index < state.len();
                self.push(Value::Boolean(more))
            }
            Op::LoopBody => self.loop_body(node),
            Op::LoopAccept => {
                let result = self.pop()?;
                self.loop_accept(result)
            }
            Op::LoopFinish => {
                let value = self.loop_finish()?;
                self.push(value)
            }
        }
    }

    // Calls

    fn call(&mut self, callee: Value, inputs: Vec<Value>, node: &Node) -> EvalResult<()> {
        match callee {
            Value::Function(FunctionValue::Closure(closure)) => {
                let NodeKind::FunctionDefinition(function) = closure.definition.kind() else {
                    return Err(not_a_function("ƒ", node));
                };
                let scope = bind_inputs(&function.inputs, &closure.scope, inputs, node)?;
                let plan = self.plan(&closure.definition, PlanKind::Function);
                self.push_frame(Frame::new(plan, scope, FrameExit::Return), node)
            }
            Value::Function(FunctionValue::Creator(closure)) => {
                let NodeKind::StructureDefinition(structure) = closure.definition.kind() else {
                    return Err(not_a_function("•", node));
                };
                let scope = bind_inputs(&structure.inputs, &closure.scope, inputs, node)?;
                let plan = self.plan(&closure.definition, PlanKind::Structure);
                self.push_frame(Frame::new(plan, scope, FrameExit::Return), node)
            }
            Value::Function(FunctionValue::Member(bound)) if bound.member.is_higher_order() => {
                self.start_member_loop(&bound, inputs, node)
            }
            Value::Function(FunctionValue::Member(bound)) => {
                let value = methods::call_member(bound.member, &bound.receiver, &inputs)?;
                self.push(value)
            }
            Value::Function(FunctionValue::Stream(kind)) => {
                if !inputs.is_empty() {
                    return Err(arity_mismatch(0, inputs.len(), node));
                }
                self.push(Value::Stream(kind))
            }
            other => Err(not_a_function(&other.to_string(), node)),
        }
    }

    fn start_member_loop(
        &mut self,
        bound: &BoundMember,
        inputs: Vec<Value>,
        node: &Node,
    ) -> EvalResult<()> {
        let Value::List(items) = &bound.receiver else {
            return Err(type_mismatch("[]", bound.receiver.type_label()));
        };
        let member = bound.member;
        let expected = if member == BuiltinMember::Combine { 2 } else { 1 };
        if inputs.len() != expected {
            return Err(arity_mismatch(expected, inputs.len(), node));
        }
        let mut inputs = inputs.into_iter();
        let accumulator = match member {
            BuiltinMember::Combine => inputs.next().unwrap_or(Value::None),
            BuiltinMember::All => Value::Boolean(true),
            _ => Value::None,
        };
        let function = inputs.next().unwrap_or(Value::None);
        let state = LoopState::new(LoopKind::Member { member, function }, Arc::clone(items), accumulator);
        self.push_loop(node, state)
    }

    fn push_loop(&mut self, node: &Node, state: LoopState) -> EvalResult<()> {
        let plan = self.plan(node, PlanKind::Loop);
        let mut frame = Frame::new(plan, self.scope(), FrameExit::Return);
        frame.looping = Some(Box::new(state));
        self.push_frame(frame, node)
    }

    fn query(&mut self, node: &Node) -> EvalResult<()> {
        let table = self.pop()?;
        let Value::Table(table) = table else {
            return Err(type_mismatch("⎡⎦", table.type_label()));
        };
        let row_cells = |row: &Node| match row.kind() {
            NodeKind::Row(row) => row.cells.clone(),
            _ => Vec::new(),
        };
        let kind = match node.kind() {
            NodeKind::Select(select) => LoopKind::Select(
                row_cells(&select.row)
                    .iter()
                    .filter_map(|cell| match cell.kind() {
                        NodeKind::Reference(reference) => Some(reference.name_text()),
                        _ => None,
                    })
                    .collect(),
            ),
            NodeKind::Update(update) => LoopKind::Update(
                row_cells(&update.row)
                    .iter()
                    .filter_map(|cell| match cell.kind() {
                        NodeKind::Bind(bind) if bind.value.is_some() => bind.primary_name(),
                        _ => None,
                    })
                    .collect(),
            ),
            NodeKind::Delete(_) => LoopKind::Delete,
            _ => return Err(unparsable(node)),
        };
        self.push_loop(node, LoopState::query(kind, table))
    }

    fn looping(&mut self) -> EvalResult<&mut LoopState> {
        self.top()?
            .looping
            .as_deref_mut()
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))
    }

    fn loop_body(&mut self, node: &Node) -> EvalResult<()> {
        let state = self.looping()?;
        let index = state.index;
        match &state.kind {
            LoopKind::Member { member, function } => {
                let item = state.items.get(index).cloned().unwrap_or(Value::None);
                let inputs = if *member == BuiltinMember::Combine {
                    vec![state.accumulator.clone(), item]
                } else {
                    vec![item]
                };
                let function = function.clone();
                self.call(function, inputs, node)
            }
            LoopKind::Select(_) | LoopKind::Update(_) | LoopKind::Delete => {
                let columns = state
                    .table
                    .as_ref()
                    .map(|table| table.columns.clone())
                    .unwrap_or_default();
                let row = state.row(index).ok_or_else(|| value_expected(node))?;
                let scope = self.scope().child();
                for (column, cell) in columns.into_iter().zip(row.iter()) {
                    scope.define(column, cell.clone());
                }
                let plan = self.plan(node, PlanKind::Row);
                self.push_frame(Frame::new(plan, scope, FrameExit::Return), node)
            }
        }
    }

    fn loop_accept(&mut self, result: Value) -> EvalResult<()> {
        let state = self.looping()?;
        let index = state.index;
        state.index += 1;
        let condition = || {
            result
                .as_bool()
                .ok_or_else(|| type_mismatch("?", result.type_label()))
        };
        match &state.kind {
            LoopKind::Member { member, .. } => {
                let item = state.items.get(index).cloned().unwrap_or(Value::None);
                match member {
                    BuiltinMember::Translate => state.results.push(result),
                    BuiltinMember::Combine => state.accumulator = result,
                    BuiltinMember::Filter => {
                        if condition()? {
                            state.results.push(item);
                        }
                    }
                    BuiltinMember::All => {
                        if !condition()? {
                            state.accumulator = Value::Boolean(false);
                            state.done = true;
                        }
                    }
                    BuiltinMember::Find => {
                        if condition()? {
                            state.accumulator = item;
                            state.done = true;
                        }
                    }
                    BuiltinMember::Until => {
                        if condition()? {
                            state.done = true;
                        } else {
                            state.results.push(item);
                        }
                    }
                    _ => {}
                }
            }
            LoopKind::Select(_) | LoopKind::Delete => {
                let keep = condition()? == matches!(state.kind, LoopKind::Select(_));
                if let (true, Some(row)) = (keep, state.row(index)) {
                    state.rows.push(row);
                }
            }
            LoopKind::Update(assigned) => {
                let Some(row) = state.row(index) else {
                    return Ok(());
                };
                match &result {
                    Value::List(cells) => {
                        let mut updated = row.to_vec();
                        if let Some(table) = &state.table {
                            for (name, cell) in assigned.iter().zip(cells.iter()) {
                                let slot = table
                                    .column_index(name)
                                    .and_then(|column| updated.get_mut(column));
                                if let Some(slot) = slot {
                                    *slot = cell.clone();
                                }
                            }
                        }
                        state.rows.push(updated.into());
                    }
                    _ => state.rows.push(row),
                }
            }
        }
        Ok(())
    }

    fn loop_finish(&mut self) -> EvalResult<Value> {
        let state = self
            .top()?
            .looping
            .take()
            .ok_or_else(|| Exception::new(ExceptionKind::ValueExpected, None))?;
        let LoopState {
            kind,
            table,
            results,
            rows,
            accumulator,
            ..
        } = *state;
        let columns = table.map(|table| table.columns.clone()).unwrap_or_default();
        Ok(match kind {
            LoopKind::Member { member, .. } => match member {
                BuiltinMember::Translate | BuiltinMember::Filter | BuiltinMember::Until => {
                    Value::list(results)
                }
                _ => accumulator,
            },
            LoopKind::Select(projected) if !projected.is_empty() => {
                let indices: Vec<usize> = projected
                    .iter()
                    .filter_map(|name| columns.iter().position(|column| column == name))
                    .collect();
                let rows = rows
                    .iter()
                    .map(|row| indices.iter().filter_map(|&i| row.get(i).cloned()).collect())
                    .collect();
                let columns = indices.iter().filter_map(|&i| columns.get(i).cloned()).collect();
                methods::table(columns, rows)?
            }
            LoopKind::Select(_) | LoopKind::Update(_) | LoopKind::Delete => {
                Value::Table(Arc::new(TableValue { columns, rows }))
            }
        })
    }

    // Conversions and borrows

    fn convert(&mut self, node: &Node, ty: &Node) -> EvalResult<()> {
        let value = self.pop()?;
        let from = value.runtime_type(&self.ctx);
        let to = raw_type(ty, &self.ctx);
        match find_conversion(&from, &to, node, &self.ctx) {
            Some(Conversion::Identity) => self.push(value),
            Some(Conversion::Builtin(conversion)) => {
                let converted = methods::convert(conversion, &value, &to)?;
                self.push(converted)
            }
            Some(Conversion::Defined(definition)) => {
                let scope = self.conversion_scope(&definition, &value);
                let plan = self.plan(&definition, PlanKind::Conversion);
                let mut frame = Frame::new(plan, scope.child(), FrameExit::Return);
                frame.this = Some(value);
                self.push_frame(frame, node)
            }
            None => Err(missing_conversion(from, to, node)),
        }
    }

    /// Scope a defined conversion's body closes over.
    fn conversion_scope(&self, definition: &Node, value: &Value) -> Scope {
        if let Value::Structure(structure) = value {
            if self.ctx.contains(&structure.definition, definition) {
                return structure.scope.clone();
            }
        }
        self.frames
            .iter()
            .rev()
            .find_map(|frame| {
                frame
                    .conversions
                    .iter()
                    .find(|(registered, _)| registered.same(definition))
                    .map(|(_, scope)| scope.clone())
            })
            .unwrap_or_else(|| self.scope())
    }

    /// Evaluate a borrowed source once per pass, then import from it. A
    /// source already being evaluated is part of a borrow cycle and is
    /// skipped.
    fn borrow(&mut self, node: &Node) -> EvalResult<()> {
        let NodeKind::Borrow(borrow) = node.kind() else {
            return Ok(());
        };
        let name = borrow.source_name();
        let Some(source) = self.ctx.project().source(&name) else {
            return Ok(());
        };
        let program = source.program.clone();
        if program.same(self.ctx.program()) {
            return Ok(());
        }
        match self.sources.get(&name).cloned() {
            Some(SourceState::Done(scope)) => {
                self.import(node, &scope);
                Ok(())
            }
            Some(SourceState::Evaluating) => Ok(()),
            None => {
                tracing::trace!(source = %name, "evaluating borrowed source");
                self.set_source(name.clone(), SourceState::Evaluating);
                let plan = self.plan(&program, PlanKind::Expression);
                let exit = FrameExit::Borrow {
                    borrow: node.clone(),
                    source: name,
                };
                self.push_frame(Frame::new(plan, Scope::root(), exit), node)
            }
        }
    }

    fn import(&mut self, borrow: &Node, from: &Scope) {
        let NodeKind::Borrow(borrow) = borrow.kind() else {
            return;
        };
        let Some(source) = self.ctx.project().source(&borrow.source_name()) else {
            return;
        };
        let wanted = borrow.name_text();
        let exports: Vec<Name> = source
            .exports()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| wanted.as_ref().is_none_or(|wanted| wanted == name))
            .collect();
        let target = self.scope();
        for name in exports {
            if let Some(value) = from.get_here(&name) {
                self.define(&target, name, value);
            }
        }
    }
}

/// A fresh scope under `parent` binding `inputs` in order. Inputs left
/// unbound must have defaults; the plan fills them in.
fn bind_inputs(
    declared: &[Node],
    parent: &Scope,
    inputs: Vec<Value>,
    node: &Node,
) -> EvalResult<Scope> {
    if inputs.len() > declared.len() {
        return Err(arity_mismatch(declared.len(), inputs.len(), node));
    }
    let scope = parent.child();
    let mut inputs = inputs.into_iter();
    for input in declared {
        let NodeKind::Bind(bind) = input.kind() else {
            continue;
        };
        match inputs.next() {
            Some(value) => {
                for alias in bind.aliases() {
                    scope.define(alias, value.clone());
                }
            }
            None if bind.value.is_none() => {
                let name = bind.primary_name().unwrap_or_else(|| Name::new("_"));
                return Err(missing_input(&name, node));
            }
            None => {}
        }
    }
    Ok(scope)
}

fn receiver_of(value: &Value) -> Option<Receiver> {
    Some(match value {
        Value::Number(_) => Receiver::Number,
        Value::Text(_) => Receiver::Text,
        Value::List(_) => Receiver::List,
        Value::Set(_) => Receiver::Set,
        Value::Map(_) => Receiver::Map,
        Value::Table(_) => Receiver::Table,
        _ => return None,
    })
}

/// `receiver.name`: a structure property or a builtin member bound to
/// the receiver.
fn property(receiver: Value, name: &Name, node: &Node) -> EvalResult {
    if let Value::Structure(structure) = &receiver {
        return structure
            .property(name)
            .ok_or_else(|| unknown_property(name, structure.name.as_str(), node));
    }
    let member = receiver_of(&receiver).and_then(|kind| BuiltinMember::find(kind, name));
    match member {
        Some(member) => Ok(Value::Function(FunctionValue::Member(Arc::new(BoundMember {
            member,
            receiver,
        })))),
        None => Err(unknown_property(name, &receiver.type_label(), node)),
    }
}

#[cfg(test)]
mod tests;
