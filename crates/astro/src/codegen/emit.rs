//! Serializes a [`ModuleIr`] to JavaScript source.

use super::ir::{Expr, Import, Item, ModuleIr, Stmt};
use std::fmt::Write as FmtWrite;

const INDENT: &str = "  ";

/// Converts a Rust string to a JavaScript string literal.
///
/// Uses JSON serialization to properly escape special characters.
///
/// # Examples
///
/// ```
/// use mdmod_astro::codegen::js_string_literal;
///
/// assert_eq!(js_string_literal("hello"), "\"hello\"");
/// assert_eq!(js_string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
/// ```
pub fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Rewrites environment references so bundlers do not substitute them.
///
/// Applied once to the finished module. Every occurrence sits inside a string
/// literal, where `\u002E` evaluates back to `.`.
///
/// # Examples
///
/// ```
/// use mdmod_astro::codegen::neutralize_env_references;
///
/// assert_eq!(
///     neutralize_env_references(r#""uses import.meta.env.SITE""#),
///     r#""uses import\u002Emeta.env.SITE""#
/// );
/// assert_eq!(neutralize_env_references("process.env"), r"process\u002Eenv");
/// ```
pub fn neutralize_env_references(code: &str) -> String {
    code.replace("import.meta.env", "import\\u002Emeta.env")
        .replace("process.env", "process\\u002Eenv")
}

/// Writes `module` as JavaScript, then neutralizes environment references.
pub fn emit(module: &ModuleIr) -> String {
    let mut emitter = Emitter::default();
    for import in &module.imports {
        emitter.import(import);
    }
    for item in &module.items {
        emitter.code.push('\n');
        emitter.item(item);
    }
    neutralize_env_references(&emitter.code)
}

#[derive(Default)]
struct Emitter {
    code: String,
}

impl Emitter {
    fn import(&mut self, import: &Import) {
        let _ = match import {
            Import::Named { names, from } => writeln!(
                self.code,
                "import {{ {} }} from {};",
                names.join(", "),
                js_string_literal(from)
            ),
            Import::Default { binding, from } => writeln!(
                self.code,
                "import {} from {};",
                binding,
                js_string_literal(from)
            ),
        };
    }

    fn item(&mut self, item: &Item) {
        match item {
            Item::Const {
                export,
                name,
                value,
            } => {
                let _ = writeln!(
                    self.code,
                    "{}const {} = {};",
                    export_prefix(*export),
                    name,
                    expr(value, 0)
                );
            }
            Item::Function {
                export,
                is_async,
                name,
                params,
                body,
            } => {
                let _ = writeln!(
                    self.code,
                    "{}{}function {}({}) {{",
                    export_prefix(*export),
                    if *is_async { "async " } else { "" },
                    name,
                    params.join(", ")
                );
                for stmt in body {
                    self.stmt(stmt);
                }
                self.code.push_str("}\n");
            }
            Item::ExportDefault(name) => {
                let _ = writeln!(self.code, "export default {};", name);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Return(value) => {
                let _ = writeln!(self.code, "{}return {};", INDENT, expr(value, 1));
            }
            Stmt::Raw(source) => {
                for line in source.lines() {
                    if line.is_empty() {
                        self.code.push('\n');
                    } else {
                        let _ = writeln!(self.code, "{}{}", INDENT, line);
                    }
                }
            }
        }
    }
}

fn export_prefix(export: bool) -> &'static str {
    if export { "export " } else { "" }
}

/// Formats an expression whose first line is already at `depth`.
fn expr(value: &Expr, depth: usize) -> String {
    match value {
        Expr::Str(text) => js_string_literal(text),
        Expr::Json(json) => serde_json::to_string(json).unwrap_or_else(|_| "null".to_string()),
        Expr::Undefined => "undefined".to_string(),
        Expr::Raw(source) => source.clone(),
        Expr::Object(entries) if entries.is_empty() => "{}".to_string(),
        Expr::Object(entries) => {
            let inner = INDENT.repeat(depth + 1);
            let fields: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    format!("{}{}: {}", inner, js_string_literal(key), expr(value, depth + 1))
                })
                .collect();
            format!("{{\n{}\n{}}}", fields.join(",\n"), INDENT.repeat(depth))
        }
        Expr::Call {
            callee,
            args,
            awaited,
        } => {
            let args: Vec<String> = args.iter().map(|arg| expr(arg, depth)).collect();
            format!(
                "{}{}({})",
                if *awaited { "await " } else { "" },
                callee,
                args.join(", ")
            )
        }
    }
}
