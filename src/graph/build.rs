//! Scope-aware traversal that turns a [`Syntax`] tree into graph nodes and
//! edges.
//!
//! Every construct the builder knows has one handler. A handler either models
//! the construct and descends into the parts it leaves unmodelled, or (for
//! anything else) the traversal walks all children in source order. Name
//! resolution goes through [`Scope`] copies, so bindings made inside a
//! function body or block never leak into siblings.

use std::collections::HashMap;

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::layout::{LayoutConfig, PositionSampler};
use crate::syntax::{ClassMember, Declarator, FunctionKind, ImportSpecifier, Pattern, Property, Span, Syntax};

use super::literal::{LiteralCategory, classify_literal};
use super::{GraphStore, NodeDraft, NodeId, NodeKind, Scope};

pub const MAIN_NODE_NAME: &str = "Main Thread";
const ANONYMOUS_FUNCTION: &str = "Anonymous Function";
const ANONYMOUS_CLASS: &str = "Anonymous Class";

/// Counters reported after a build. `functions` counts function constructs,
/// `variables` every declarator, `imports` distinct module specifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub functions: usize,
    pub variables: usize,
    pub imports: usize,
    pub nodes: usize,
    pub edges: usize,
}

/// Which sphere shell a new node spawns on.
#[derive(Clone, Copy, Debug)]
enum Shell {
    Default,
    Declaration,
    Value,
}

pub struct GraphBuilder<'a> {
    store: &'a mut GraphStore,
    sampler: &'a mut PositionSampler,
    config: &'a LayoutConfig,
    main: NodeId,
    imported_modules: HashMap<String, NodeId>,
    summary: BuildSummary,
}

impl<'a> GraphBuilder<'a> {
    /// Empties `store` and seeds it with the main node at the origin.
    pub fn new(
        store: &'a mut GraphStore,
        sampler: &'a mut PositionSampler,
        config: &'a LayoutConfig,
    ) -> Self {
        store.clear();
        let main = store.add_node(
            NodeDraft::new(MAIN_NODE_NAME, NodeKind::Main).with_detail("Program"),
            Vec3::ZERO,
        );

        Self {
            store,
            sampler,
            config,
            main,
            imported_modules: HashMap::new(),
            summary: BuildSummary::default(),
        }
    }

    pub fn build(mut self, program: &Syntax) -> BuildSummary {
        let mut scope = Scope::root();
        let main = self.main;
        self.visit(program, main, &mut scope);

        self.summary.nodes = self.store.node_count();
        self.summary.edges = self.store.edge_count();
        debug!(summary = ?self.summary, "graph built");
        self.summary
    }

    fn visit(&mut self, node: &Syntax, parent: NodeId, scope: &mut Scope) {
        match node {
            Syntax::Program { body } => self.visit_statements(body, parent, scope, None),
            Syntax::Block { body } => {
                let mut block_scope = scope.child();
                self.visit_statements(body, parent, &mut block_scope, None);
            }
            Syntax::Import {
                source,
                specifiers,
                span,
            } => self.visit_import(source, specifiers, *span, scope),
            Syntax::Variables { declarations } => {
                for declarator in declarations {
                    self.visit_declarator(declarator, parent, scope);
                }
            }
            Syntax::Function {
                kind,
                name,
                params,
                body,
                span,
            } => {
                self.visit_function(*kind, name.as_deref(), params, body, *span, scope);
            }
            Syntax::Class {
                name,
                superclass,
                members,
                span,
                ..
            } => self.visit_class(
                name.as_deref(),
                superclass.as_deref(),
                members,
                *span,
                parent,
                scope,
            ),
            Syntax::Call { callee, arguments } => self.visit_call(callee, arguments, parent, scope),
            Syntax::New { callee, arguments } => self.visit_new(callee, arguments, parent, scope),
            Syntax::Member {
                object,
                property,
                computed,
            } => {
                self.visit(object, parent, scope);
                if *computed {
                    self.visit(property, parent, scope);
                }
            }
            Syntax::Identifier { name } => self.visit_identifier(name, scope),
            Syntax::Literal { .. } => {}
            Syntax::Object { properties } => {
                for property in properties {
                    self.visit(&property.value, parent, scope);
                }
            }
            Syntax::Array { elements } => self.visit_all(elements, parent, scope),
            Syntax::Expression { expression } => self.visit(expression, parent, scope),
            Syntax::Other { kind, children } if opens_scope(kind) => {
                let mut inner = scope.child();
                self.visit_all(children, parent, &mut inner);
            }
            Syntax::Other { children, .. } => self.visit_all(children, parent, scope),
        }
    }

    fn visit_all(&mut self, nodes: &[Syntax], parent: NodeId, scope: &mut Scope) {
        for node in nodes {
            self.visit(node, parent, scope);
        }
    }

    /// Class declarations go first so that earlier statements can instantiate
    /// them. Inside a function body, `captures` carries the function node and
    /// the scope it was declared in, for bare identifier statements that refer
    /// to outer names.
    fn visit_statements(
        &mut self,
        body: &[Syntax],
        parent: NodeId,
        scope: &mut Scope,
        captures: Option<(NodeId, &Scope)>,
    ) {
        let classes = body.iter().filter(|statement| statement.is_class_declaration());
        let rest = body.iter().filter(|statement| !statement.is_class_declaration());

        for statement in classes.chain(rest) {
            if let Some((function, outer)) = captures {
                self.capture_outer_reference(function, statement, outer);
            }
            self.visit(statement, parent, scope);
        }
    }

    fn capture_outer_reference(&mut self, function: NodeId, statement: &Syntax, outer: &Scope) {
        if let Some(name) = statement.bare_identifier()
            && let Some(bound) = outer.lookup(name)
        {
            self.store.connect(function, bound);
        }
    }

    fn visit_import(
        &mut self,
        source: &str,
        specifiers: &[ImportSpecifier],
        span: Option<Span>,
        scope: &mut Scope,
    ) {
        let import = self.resolve_import(source, span);

        for specifier in specifiers {
            match specifier {
                ImportSpecifier::Namespace(local) => scope.bind(local, import),
                ImportSpecifier::Default(local) | ImportSpecifier::Named(local) => {
                    let binding = self.spawn(
                        NodeDraft::new(local, NodeKind::Class)
                            .with_detail(format!("Imported from {source}")),
                        Shell::Default,
                    );
                    self.store.connect(self.main, binding);
                    scope.bind(local, binding);
                }
            }
        }
    }

    /// One import node per distinct module specifier. Repeated references
    /// reuse the node; the main edge is deduplicated by the store.
    fn resolve_import(&mut self, specifier: &str, span: Option<Span>) -> NodeId {
        let import = match self.imported_modules.get(specifier) {
            Some(&import) => import,
            None => {
                let import = self.spawn(
                    NodeDraft::new(specifier, NodeKind::Import)
                        .with_detail("Module")
                        .with_span(span),
                    Shell::Default,
                );
                self.imported_modules.insert(specifier.to_owned(), import);
                self.summary.imports += 1;
                import
            }
        };

        self.store.connect(self.main, import);
        import
    }

    fn visit_declarator(&mut self, declarator: &Declarator, parent: NodeId, scope: &mut Scope) {
        self.summary.variables += 1;
        let owner = self.owner(scope);
        let span = declarator.span;
        let init = declarator.init.as_ref();

        if let Some(specifier) = init.and_then(Syntax::require_specifier) {
            self.bind_required(specifier, &declarator.target, span, scope);
            return;
        }

        let Pattern::Identifier(name) = &declarator.target else {
            warn!(pattern = declarator.target.kind_name(), "skipping declaration with an unsupported target");
            if let Some(init) = init {
                self.visit(init, parent, scope);
            }
            return;
        };

        let instance_of = match init {
            Some(Syntax::New { callee, .. }) => self.class_binding(callee, scope),
            _ => None,
        };

        match (init, instance_of) {
            (Some(Syntax::Object { properties }), _) => {
                let object = self.spawn(
                    NodeDraft::new(name, NodeKind::Object)
                        .with_detail("Dictionary")
                        .with_span(span),
                    Shell::Default,
                );
                self.store.connect(owner, object);
                scope.bind(name, object);
                self.expand_properties(properties, object, scope);
            }
            (Some(Syntax::Array { elements }), _) => {
                let array = self.spawn(
                    NodeDraft::new(name, NodeKind::Array)
                        .with_detail("Array")
                        .with_span(span),
                    Shell::Default,
                );
                self.store.connect(owner, array);
                scope.bind(name, array);
                self.expand_elements(elements, array, scope);
            }
            (Some(Syntax::New { arguments, .. }), Some((class, class_name))) => {
                self.visit_all(arguments, parent, scope);
                let instance = self.spawn(
                    NodeDraft::new(name, NodeKind::Variable)
                        .with_detail(format!("Instance of {class_name}"))
                        .with_value(format!("new {class_name}(...)"))
                        .with_span(span),
                    Shell::Default,
                );
                self.store.connect(class, instance);
                self.store.connect(owner, instance);
                scope.bind(name, instance);
            }
            (Some(Syntax::Literal { raw }), _) => {
                let variable = self.spawn(
                    NodeDraft::new(name, NodeKind::Variable)
                        .with_detail(classify_literal(raw).label())
                        .with_value(raw)
                        .with_span(span),
                    Shell::Value,
                );
                self.store.connect(owner, variable);
                scope.bind(name, variable);
            }
            (init, _) => {
                match init {
                    Some(Syntax::Function {
                        kind,
                        name: None,
                        params,
                        body,
                        span,
                    }) => self.visit_function(*kind, Some(name.as_str()), params, body, *span, scope),
                    Some(init) => self.visit(init, parent, scope),
                    None => {}
                }

                let detail = init.map_or(LiteralCategory::Undefined.label(), Syntax::kind_name);
                let variable = self.spawn(
                    NodeDraft::new(name, NodeKind::Variable)
                        .with_detail(detail)
                        .with_span(span),
                    Shell::Value,
                );
                self.store.connect(owner, variable);
                scope.bind(name, variable);
            }
        }
    }

    /// `const x = require("m")` and `const { a, b } = require("m")`: each bound
    /// name becomes a class node hanging off the module.
    fn bind_required(
        &mut self,
        specifier: &str,
        target: &Pattern,
        span: Option<Span>,
        scope: &mut Scope,
    ) {
        let import = self.resolve_import(specifier, span);
        let names = target.bound_names();
        if names.is_empty() {
            warn!(pattern = target.kind_name(), module = specifier, "required module is not bound to a name");
        }

        for name in names {
            let binding = self.spawn(
                NodeDraft::new(name, NodeKind::Class)
                    .with_detail(format!("Imported from {specifier}")),
                Shell::Default,
            );
            self.store.connect(import, binding);
            scope.bind(name, binding);
        }
    }

    /// Only declarations bind their name; expressions and arrows are reached
    /// through whatever holds them.
    fn visit_function(
        &mut self,
        kind: FunctionKind,
        name: Option<&str>,
        params: &[Syntax],
        body: &Syntax,
        span: Option<Span>,
        scope: &mut Scope,
    ) {
        self.summary.functions += 1;
        let function = self.spawn(
            NodeDraft::new(name.unwrap_or(ANONYMOUS_FUNCTION), NodeKind::Function)
                .with_detail(kind.label())
                .with_span(span),
            Shell::Declaration,
        );
        self.store.connect(self.main, function);

        if kind == FunctionKind::Declaration
            && let Some(name) = name
        {
            scope.bind(name, function);
        }

        self.visit_function_body(function, params, body, scope);
    }

    fn visit_function_body(
        &mut self,
        function: NodeId,
        params: &[Syntax],
        body: &Syntax,
        outer: &Scope,
    ) {
        let mut function_scope = outer.function_child(function);

        for param in params {
            let Some(name) = parameter_name(param) else {
                warn!(kind = param.kind_name(), "skipping unsupported parameter");
                continue;
            };
            let parameter = self.spawn(
                NodeDraft::new(name, NodeKind::Variable).with_detail("Parameter"),
                Shell::Default,
            );
            self.store.connect(function, parameter);
            function_scope.bind(name, parameter);
        }

        match body {
            Syntax::Block { body: statements } => self.visit_statements(
                statements,
                function,
                &mut function_scope,
                Some((function, outer)),
            ),
            expression => {
                self.capture_outer_reference(function, expression, outer);
                self.visit(expression, function, &mut function_scope);
            }
        }
    }

    fn visit_class(
        &mut self,
        name: Option<&str>,
        superclass: Option<&Syntax>,
        members: &[ClassMember],
        span: Option<Span>,
        parent: NodeId,
        scope: &mut Scope,
    ) {
        let class = self.spawn(
            NodeDraft::new(name.unwrap_or(ANONYMOUS_CLASS), NodeKind::Class)
                .with_detail("Class")
                .with_span(span),
            Shell::Declaration,
        );
        self.store.connect(self.main, class);

        let base = match superclass {
            Some(Syntax::Identifier { name }) => scope.lookup(name),
            _ => None,
        };
        match (base, superclass) {
            (Some(base), _) => {
                self.store.connect(base, class);
            }
            (None, Some(superclass)) => self.visit(superclass, parent, scope),
            (None, None) => {}
        }

        if let Some(name) = name {
            scope.bind(name, class);
        }

        for member in members {
            if member.is_method {
                let method = self.spawn(
                    NodeDraft::new(
                        member.name.as_deref().unwrap_or(ANONYMOUS_FUNCTION),
                        NodeKind::Function,
                    )
                    .with_detail("Method"),
                    Shell::Default,
                );
                self.store.connect(class, method);
                if let Some(Syntax::Function { params, body, .. }) = &member.value {
                    self.visit_function_body(method, params, body, scope);
                }
            } else if let Some(value) = &member.value {
                self.visit(value, class, scope);
            }
        }
    }

    fn visit_call(&mut self, callee: &Syntax, arguments: &[Syntax], parent: NodeId, scope: &mut Scope) {
        if let Syntax::Identifier { name } = callee
            && name == "require"
        {
            match arguments.first().and_then(Syntax::string_value) {
                Some(specifier) => {
                    self.resolve_import(specifier, None);
                }
                None => {
                    debug!("require call without a literal module specifier");
                    self.visit_all(arguments, parent, scope);
                }
            }
            return;
        }

        if let Some((import, member)) = self.module_member(callee, scope) {
            let owner = self.owner(scope);
            let function = self.spawn(
                NodeDraft::new(member, NodeKind::Function).with_detail("Module member"),
                Shell::Default,
            );
            self.store.connect(import, function);
            self.store.connect(owner, function);
            self.visit_all(arguments, parent, scope);
            return;
        }

        if let Syntax::Identifier { name } = callee
            && let Some(bound) = scope.lookup(name)
        {
            if self.store.kind_of(bound) == Some(NodeKind::Class) {
                self.instantiate(name, bound, scope);
            } else {
                let call_site = self.spawn(
                    NodeDraft::new(format!("Call: {name}"), NodeKind::Function)
                        .with_detail("Call site"),
                    Shell::Default,
                );
                self.store.connect(bound, call_site);
                self.store.connect(parent, call_site);
            }
            self.visit_all(arguments, parent, scope);
            return;
        }

        self.visit(callee, parent, scope);
        self.visit_all(arguments, parent, scope);
    }

    fn visit_new(&mut self, callee: &Syntax, arguments: &[Syntax], parent: NodeId, scope: &mut Scope) {
        match self.class_binding(callee, scope) {
            Some((class, class_name)) => {
                self.instantiate(class_name, class, scope);
            }
            None => self.visit(callee, parent, scope),
        }
        self.visit_all(arguments, parent, scope);
    }

    fn visit_identifier(&mut self, name: &str, scope: &Scope) {
        match (scope.lookup(name), scope.enclosing_function()) {
            (Some(bound), Some(function)) => {
                self.store.connect(function, bound);
            }
            (Some(_), None) => {}
            (None, _) => debug!(identifier = name, "unresolved identifier"),
        }
    }

    fn instantiate(&mut self, class_name: &str, class: NodeId, scope: &Scope) {
        let owner = self.owner(scope);
        let instance = self.spawn(
            NodeDraft::new(format!("new {class_name}"), NodeKind::Variable)
                .with_detail(format!("Instance of {class_name}")),
            Shell::Default,
        );
        self.store.connect(class, instance);
        self.store.connect(owner, instance);
    }

    fn expand_properties(&mut self, properties: &[Property], container: NodeId, scope: &mut Scope) {
        for property in properties {
            let kind = match property.value {
                Syntax::Array { .. } => NodeKind::Array,
                _ => NodeKind::Key,
            };
            let key = self.spawn(
                describe_value(NodeDraft::new(&property.key, kind), &property.value),
                Shell::Default,
            );
            self.store.connect(container, key);
            self.expand_value(&property.value, key, scope);
        }
    }

    fn expand_elements(&mut self, elements: &[Syntax], container: NodeId, scope: &mut Scope) {
        for (index, element) in elements.iter().enumerate() {
            let node = self.spawn(
                describe_value(NodeDraft::new(format!("[{index}]"), NodeKind::Element), element),
                Shell::Default,
            );
            self.store.connect(container, node);
            self.expand_value(element, node, scope);
        }
    }

    fn expand_value(&mut self, value: &Syntax, node: NodeId, scope: &mut Scope) {
        match value {
            Syntax::Object { properties } => self.expand_properties(properties, node, scope),
            Syntax::Array { elements } => self.expand_elements(elements, node, scope),
            Syntax::Literal { .. } => {}
            other => self.visit(other, node, scope),
        }
    }

    fn spawn(&mut self, draft: NodeDraft, shell: Shell) -> NodeId {
        let radius = match shell {
            Shell::Default => self.config.shell_radius,
            Shell::Declaration => self.config.declaration_shell_radius,
            Shell::Value => self.config.value_shell_radius,
        };
        let sample = self
            .sampler
            .sample(radius, self.config.min_spacing(), self.store.positions());
        trace!(
            attempts = sample.attempts,
            spaced = sample.spaced,
            radius,
            "sampled spawn position"
        );
        self.store.add_node(draft, sample.position)
    }

    fn owner(&self, scope: &Scope) -> NodeId {
        scope.enclosing_function().unwrap_or(self.main)
    }

    /// `name.member` where `name` is bound to an import node.
    fn module_member<'s>(&self, callee: &'s Syntax, scope: &Scope) -> Option<(NodeId, &'s str)> {
        let Syntax::Member {
            object,
            property,
            computed: false,
        } = callee
        else {
            return None;
        };
        let (Syntax::Identifier { name }, Syntax::Identifier { name: member }) =
            (object.as_ref(), property.as_ref())
        else {
            return None;
        };

        let bound = scope.lookup(name)?;
        (self.store.kind_of(bound) == Some(NodeKind::Import)).then_some((bound, member.as_str()))
    }

    /// Identifier callee bound to a class node.
    fn class_binding<'s>(&self, callee: &'s Syntax, scope: &Scope) -> Option<(NodeId, &'s str)> {
        let Syntax::Identifier { name } = callee else {
            return None;
        };
        let bound = scope.lookup(name)?;
        (self.store.kind_of(bound) == Some(NodeKind::Class)).then_some((bound, name.as_str()))
    }
}

/// Identifier parameters, including defaulted (`a = 1`) and rest (`...a`) forms.
fn parameter_name(param: &Syntax) -> Option<&str> {
    match param {
        Syntax::Identifier { name } => Some(name),
        Syntax::Other { kind, children } if kind == "AssignmentPattern" || kind == "RestElement" => {
            match children.first() {
                Some(Syntax::Identifier { name }) => Some(name),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Generic constructs whose declarations must not outlive them: loop headers
/// and switch bodies, whose case lists are not blocks.
fn opens_scope(kind: &str) -> bool {
    matches!(
        kind,
        "ForStatement" | "ForInStatement" | "ForOfStatement" | "SwitchStatement"
    )
}

fn describe_value(draft: NodeDraft, value: &Syntax) -> NodeDraft {
    match value {
        Syntax::Array { .. } => draft.with_detail("Array"),
        Syntax::Object { .. } => draft.with_detail("Dictionary"),
        Syntax::Literal { raw } => draft.with_detail(classify_literal(raw).label()).with_value(raw),
        other => draft.with_detail(other.kind_name()),
    }
}
