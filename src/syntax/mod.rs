//! Closed syntax-tree model consumed by the graph builder.
//!
//! Parsing itself happens in an external process (see [`parser`]); its ESTree
//! JSON output is folded into [`Syntax`], a tagged union over the constructs the
//! builder understands plus one [`Syntax::Other`] variant that keeps every
//! nested node for generic structural descent.

mod estree;
mod parser;

use serde::Serialize;

pub use parser::{CommandParser, DEFAULT_PARSER_COMMAND, ParseError, SourceParser, parse_estree_json};

/// Range of a construct in the analysed source text, in UTF-16 code units
/// as JavaScript parsers report string offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
}

impl FunctionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Declaration => "FunctionDeclaration",
            Self::Expression => "FunctionExpression",
            Self::Arrow => "ArrowFunctionExpression",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportSpecifier {
    Default(String),
    Named(String),
    Namespace(String),
}

/// Left-hand side of a variable declarator.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Identifier(String),
    /// Local names introduced by object destructuring, in source order.
    Object(Vec<String>),
    Unsupported(String),
}

impl Pattern {
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Identifier(_) => "Identifier",
            Self::Object(_) => "ObjectPattern",
            Self::Unsupported(kind) => kind,
        }
    }

    pub fn bound_names(&self) -> &[String] {
        match self {
            Self::Identifier(name) => std::slice::from_ref(name),
            Self::Object(names) => names,
            Self::Unsupported(_) => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declarator {
    pub target: Pattern,
    pub init: Option<Syntax>,
    pub span: Option<Span>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMember {
    pub name: Option<String>,
    pub is_method: bool,
    pub value: Option<Syntax>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Syntax,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Syntax {
    Program {
        body: Vec<Syntax>,
    },
    Block {
        body: Vec<Syntax>,
    },
    Import {
        source: String,
        specifiers: Vec<ImportSpecifier>,
        span: Option<Span>,
    },
    Variables {
        declarations: Vec<Declarator>,
    },
    Function {
        kind: FunctionKind,
        name: Option<String>,
        params: Vec<Syntax>,
        body: Box<Syntax>,
        span: Option<Span>,
    },
    Class {
        name: Option<String>,
        is_expression: bool,
        superclass: Option<Box<Syntax>>,
        members: Vec<ClassMember>,
        span: Option<Span>,
    },
    Call {
        callee: Box<Syntax>,
        arguments: Vec<Syntax>,
    },
    New {
        callee: Box<Syntax>,
        arguments: Vec<Syntax>,
    },
    Member {
        object: Box<Syntax>,
        property: Box<Syntax>,
        computed: bool,
    },
    Identifier {
        name: String,
    },
    Literal {
        raw: String,
    },
    Object {
        properties: Vec<Property>,
    },
    Array {
        elements: Vec<Syntax>,
    },
    Expression {
        expression: Box<Syntax>,
    },
    Other {
        kind: String,
        children: Vec<Syntax>,
    },
}

impl Syntax {
    /// Converts an ESTree `Program` JSON value. Returns `None` when the value is
    /// not a program node.
    pub fn from_estree(value: &serde_json::Value) -> Option<Self> {
        match estree::convert(value)? {
            program @ Self::Program { .. } => Some(program),
            _ => None,
        }
    }

    /// ESTree construct name, used as the descriptive type of declarations
    /// whose initializer carries no finer classification.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Program { .. } => "Program",
            Self::Block { .. } => "BlockStatement",
            Self::Import { .. } => "ImportDeclaration",
            Self::Variables { .. } => "VariableDeclaration",
            Self::Function { kind, .. } => kind.label(),
            Self::Class {
                is_expression: true,
                ..
            } => "ClassExpression",
            Self::Class { .. } => "ClassDeclaration",
            Self::Call { .. } => "CallExpression",
            Self::New { .. } => "NewExpression",
            Self::Member { .. } => "MemberExpression",
            Self::Identifier { .. } => "Identifier",
            Self::Literal { .. } => "Literal",
            Self::Object { .. } => "ObjectExpression",
            Self::Array { .. } => "ArrayExpression",
            Self::Expression { .. } => "ExpressionStatement",
            Self::Other { kind, .. } => kind,
        }
    }

    /// True for `class A {}`, also when wrapped in `export` or `export default`.
    pub fn is_class_declaration(&self) -> bool {
        match self {
            Self::Class { is_expression, .. } => !is_expression,
            Self::Other { kind, children }
                if kind == "ExportNamedDeclaration" || kind == "ExportDefaultDeclaration" =>
            {
                children.iter().any(Self::is_class_declaration)
            }
            _ => false,
        }
    }

    /// Identifier name of a bare identifier, or of an expression statement
    /// wrapping one.
    pub fn bare_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier { name } => Some(name),
            Self::Expression { expression } => match expression.as_ref() {
                Self::Identifier { name } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Module specifier of a `require("...")` call.
    pub fn require_specifier(&self) -> Option<&str> {
        let Self::Call { callee, arguments } = self else {
            return None;
        };
        if !matches!(callee.as_ref(), Self::Identifier { name } if name == "require") {
            return None;
        }

        arguments.first().and_then(Self::string_value)
    }

    /// Contents of a quoted string literal.
    pub fn string_value(&self) -> Option<&str> {
        match self {
            Self::Literal { raw } => unquote(raw),
            _ => None,
        }
    }
}

fn unquote(raw: &str) -> Option<&str> {
    ['"', '\'', '`'].into_iter().find_map(|quote| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
