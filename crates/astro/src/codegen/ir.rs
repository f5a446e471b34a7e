//! Structured description of a generated module.

use serde_json::Value as JsonValue;

/// A whole module: imports first, then top-level items in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleIr {
    /// Import declarations.
    pub imports: Vec<Import>,
    /// Top-level statements.
    pub items: Vec<Item>,
}

impl ModuleIr {
    /// Appends an import.
    pub fn import(&mut self, import: Import) -> &mut Self {
        self.imports.push(import);
        self
    }

    /// Appends a top-level item.
    pub fn item(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `import { a, b } from "source";`
    Named {
        /// Imported bindings.
        names: Vec<String>,
        /// Module specifier.
        from: String,
    },
    /// `import binding from "source";`
    Default {
        /// Local binding.
        binding: String,
        /// Module specifier.
        from: String,
    },
}

impl Import {
    /// Named import of `names` from `from`.
    pub fn named<I, S>(names: I, from: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Import::Named {
            names: names.into_iter().map(Into::into).collect(),
            from: from.into(),
        }
    }

    /// Default import of `from` as `binding`.
    pub fn default_from(binding: impl Into<String>, from: impl Into<String>) -> Self {
        Import::Default {
            binding: binding.into(),
            from: from.into(),
        }
    }
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A string literal.
    Str(String),
    /// A JSON value written as an object/array/primitive literal.
    Json(JsonValue),
    /// `undefined`
    Undefined,
    /// An object literal; keys are written as string literals.
    Object(Vec<(String, Expr)>),
    /// `[await] callee(args)`
    Call {
        /// Function being called.
        callee: String,
        /// Arguments.
        args: Vec<Expr>,
        /// Whether the call is awaited.
        awaited: bool,
    },
    /// Pre-formed JavaScript source. Document text never goes here.
    Raw(String),
}

impl Expr {
    /// String literal, or `undefined` for `None`.
    pub fn optional_str(value: Option<&str>) -> Self {
        value.map_or(Expr::Undefined, |v| Expr::Str(v.to_string()))
    }
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `[export] const name = value;`
    Const {
        /// Whether the binding is exported.
        export: bool,
        /// Binding name.
        name: String,
        /// Initializer.
        value: Expr,
    },
    /// `[export] [async] function name(params) { body }`
    Function {
        /// Whether the function is exported.
        export: bool,
        /// Whether the function is `async`.
        is_async: bool,
        /// Function name.
        name: String,
        /// Parameter names.
        params: Vec<String>,
        /// Body statements, one per entry; may span several lines.
        body: Vec<Stmt>,
    },
    /// `export default name;`
    ExportDefault(String),
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `return expr;`
    Return(Expr),
    /// Pre-formed JavaScript source, written line by line at the current
    /// indentation.
    Raw(String),
}
