//! Minimal Dart source model and formatter.
//!
//! Only what the generated icon classes need: a library with header comments
//! and imports, classes with a private const constructor and `static const`
//! fields, and a handful of constant expressions. The formatter checks the
//! model before printing anything; it never writes text that would not parse.
use crate::{error::EmitError, sanitize::is_reserved};
use std::collections::HashSet;

pub const LINE_WIDTH: usize = 80;
const INDENT: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Str(String),
    Null,
    /// Integer literal printed in hexadecimal.
    Hex(u32),
    /// Reference to another member of the enclosing class.
    Member(String),
    /// `const` constructor invocation; `const` is implied by the field.
    Call { callee: String, args: Vec<Arg> },
    Map {
        key_type: String,
        value_type: String,
        entries: Vec<(Expr, Expr)>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Positional(Expr),
    Named(String, Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DartField {
    pub docs: Vec<String>,
    pub ty: String,
    pub name: String,
    pub value: Expr,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DartClass {
    pub docs: Vec<String>,
    pub name: String,
    pub fields: Vec<DartField>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DartLibrary {
    /// Line comments at the top of the file, without the `//` prefix.
    pub header: Vec<String>,
    pub imports: Vec<String>,
    pub classes: Vec<DartClass>,
}

#[derive(Clone, Copy, Debug)]
pub struct DartFormatter {
    width: usize,
}

impl Default for DartFormatter {
    fn default() -> Self {
        Self { width: LINE_WIDTH }
    }
}

impl DartFormatter {
    pub fn with_width(width: usize) -> Self {
        Self { width }
    }

    pub fn format(&self, library: &DartLibrary) -> Result<String, EmitError> {
        for class in &library.classes {
            validate_class(class)?;
        }

        let mut out = String::new();
        for line in &library.header {
            push_comment(&mut out, "//", line, 0);
        }
        if !library.header.is_empty() {
            out.push('\n');
        }
        for import in &library.imports {
            out.push_str(&format!("import {};\n", quote(import)));
        }
        for class in &library.classes {
            if !out.is_empty() {
                out.push('\n');
            }
            self.write_class(&mut out, class);
        }
        Ok(out)
    }

    fn write_class(&self, out: &mut String, class: &DartClass) {
        for line in &class.docs {
            push_comment(out, "///", line, 0);
        }
        out.push_str(&format!("class {} {{\n", class.name));
        push_indent(out, INDENT);
        out.push_str(&format!("const {}._();\n", class.name));
        for field in &class.fields {
            out.push('\n');
            self.write_field(out, field, INDENT);
        }
        out.push_str("}\n");
    }

    fn write_field(&self, out: &mut String, field: &DartField, indent: usize) {
        for line in &field.docs {
            push_comment(out, "///", line, indent);
        }
        push_indent(out, indent);
        let head = format!("static const {} {} = ", field.ty, field.name);
        out.push_str(&head);
        self.write_expr(out, &field.value, indent, indent + head.len(), 1);
        out.push_str(";\n");
    }

    /// Writes `expr` starting at column `column`. `trailing` is the number of
    /// characters that must still fit after it on the same line.
    fn write_expr(
        &self,
        out: &mut String,
        expr: &Expr,
        indent: usize,
        column: usize,
        trailing: usize,
    ) {
        let text = flat(expr);
        if column + text.len() + trailing <= self.width {
            out.push_str(&text);
            return;
        }
        match expr {
            Expr::Call { callee, args } if !args.is_empty() => {
                out.push_str(callee);
                out.push_str("(\n");
                let inner = indent + INDENT;
                for arg in args {
                    push_indent(out, inner);
                    match arg {
                        Arg::Positional(e) => self.write_expr(out, e, inner, inner, 1),
                        Arg::Named(name, e) => {
                            out.push_str(name);
                            out.push_str(": ");
                            self.write_expr(out, e, inner, inner + name.len() + 2, 1);
                        }
                    }
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push(')');
            }
            Expr::Map {
                key_type,
                value_type,
                entries,
            } if !entries.is_empty() => {
                out.push_str(&format!("<{key_type}, {value_type}>{{\n"));
                let inner = indent + INDENT;
                for (key, value) in entries {
                    push_indent(out, inner);
                    let key = flat(key);
                    out.push_str(&key);
                    out.push_str(": ");
                    self.write_expr(out, value, inner, inner + key.len() + 2, 1);
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push('}');
            }
            _ => out.push_str(&text),
        }
    }
}

fn flat(expr: &Expr) -> String {
    match expr {
        Expr::Str(s) => quote(s),
        Expr::Null => "null".to_string(),
        Expr::Hex(v) => format!("0x{v:04x}"),
        Expr::Member(name) => name.clone(),
        Expr::Call { callee, args } => {
            let args: Vec<String> = args
                .iter()
                .map(|a| match a {
                    Arg::Positional(e) => flat(e),
                    Arg::Named(name, e) => format!("{name}: {}", flat(e)),
                })
                .collect();
            format!("{callee}({})", args.join(", "))
        }
        Expr::Map {
            key_type,
            value_type,
            entries,
        } => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", flat(k), flat(v)))
                .collect();
            format!("<{key_type}, {value_type}>{{{}}}", entries.join(", "))
        }
    }
}

/// Single quoted Dart string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn push_indent(out: &mut String, indent: usize) {
    out.push_str(&" ".repeat(indent));
}

fn push_comment(out: &mut String, marker: &str, text: &str, indent: usize) {
    for line in text.lines() {
        push_indent(out, indent);
        out.push_str(marker);
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
    if text.is_empty() {
        push_indent(out, indent);
        out.push_str(marker);
        out.push('\n');
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !is_reserved(name)
}

fn validate_class(class: &DartClass) -> Result<(), EmitError> {
    if !is_identifier(&class.name) {
        return Err(EmitError::InvalidIdentifier(class.name.clone()));
    }
    let mut members = HashSet::new();
    members.insert(class.name.as_str());
    for field in &class.fields {
        if !is_identifier(&field.name) {
            return Err(EmitError::InvalidIdentifier(field.name.clone()));
        }
        if !members.insert(field.name.as_str()) {
            return Err(EmitError::DuplicateMember(field.name.clone()));
        }
    }
    for field in &class.fields {
        validate_expr(&field.value, &members)?;
    }
    Ok(())
}

fn validate_expr(expr: &Expr, members: &HashSet<&str>) -> Result<(), EmitError> {
    match expr {
        Expr::Str(_) | Expr::Null | Expr::Hex(_) => Ok(()),
        Expr::Member(name) => {
            if members.contains(name.as_str()) {
                Ok(())
            } else {
                Err(EmitError::InvalidIdentifier(name.clone()))
            }
        }
        Expr::Call { callee, args } => {
            if !is_identifier(callee) {
                return Err(EmitError::InvalidIdentifier(callee.clone()));
            }
            for arg in args {
                match arg {
                    Arg::Positional(e) => validate_expr(e, members)?,
                    Arg::Named(name, e) => {
                        if !is_identifier(name) {
                            return Err(EmitError::InvalidIdentifier(name.clone()));
                        }
                        validate_expr(e, members)?;
                    }
                }
            }
            Ok(())
        }
        Expr::Map { entries, .. } => {
            for (key, value) in entries {
                validate_expr(key, members)?;
                validate_expr(value, members)?;
            }
            Ok(())
        }
    }
}
