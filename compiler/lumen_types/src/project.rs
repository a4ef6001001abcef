//! Projects: a main program plus named sources it can borrow from.

use lumen_ir::{Name, Node, NodeKind};

/// One named program.
#[derive(Clone, Debug)]
pub struct Source {
    pub name: Name,
    pub program: Node,
}

impl Source {
    /// Top-level statements of this source's program.
    pub fn statements(&self) -> Vec<Node> {
        match self.program.kind() {
            NodeKind::Program(program) => program.block.children(),
            _ => Vec::new(),
        }
    }

    pub fn borrows(&self) -> Vec<Node> {
        match self.program.kind() {
            NodeKind::Program(program) => program.borrows.clone(),
            _ => Vec::new(),
        }
    }

    /// Top-level definitions another source can borrow, by name.
    pub fn exports(&self) -> Vec<(Name, Node)> {
        let mut out = Vec::new();
        for statement in self.statements() {
            match statement.kind() {
                NodeKind::Bind(bind) => {
                    out.extend(bind.aliases().into_iter().map(|name| (name, statement.clone())));
                }
                NodeKind::FunctionDefinition(function) => {
                    out.extend(function.name_text().map(|name| (name, statement.clone())));
                }
                NodeKind::StructureDefinition(structure) => {
                    out.extend(structure.name_text().map(|name| (name, statement.clone())));
                }
                _ => {}
            }
        }
        out
    }

    pub fn export(&self, name: &str) -> Option<Node> {
        self.exports()
            .into_iter()
            .find(|(export, _)| export.as_str() == name)
            .map(|(_, node)| node)
    }
}

/// A main program and its supplementary sources.
#[derive(Clone, Debug)]
pub struct Project {
    main: Source,
    supplements: Vec<Source>,
}

impl Project {
    pub const MAIN: &'static str = "main";

    pub fn new(program: Node) -> Self {
        Project {
            main: Source {
                name: Name::new(Project::MAIN),
                program,
            },
            supplements: Vec::new(),
        }
    }

    /// Parse `text` as the main program.
    pub fn parse(text: &str) -> Self {
        Project::new(lumen_parse::parse_source(text))
    }

    #[must_use]
    pub fn with_source(mut self, name: &str, program: Node) -> Self {
        self.supplements.push(Source {
            name: Name::new(name),
            program,
        });
        self
    }

    #[must_use]
    pub fn with_source_text(self, name: &str, text: &str) -> Self {
        self.with_source(name, lumen_parse::parse_source(text))
    }

    pub fn main(&self) -> &Source {
        &self.main
    }

    /// Every source, main first.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        std::iter::once(&self.main).chain(&self.supplements)
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources().find(|source| source.name.as_str() == name)
    }

    /// The source whose program is `program`.
    pub fn source_of(&self, program: &Node) -> Option<&Source> {
        self.sources().find(|source| source.program.same(program))
    }
}
