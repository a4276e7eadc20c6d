use std::fmt::{self, Write};

use itertools::Itertools;

use super::*;

macro_rules! indent_write {
    ($dst:expr, $($arg:tt)*) => {{
        $dst.write_indent();
        write!($dst, $($arg)*)
    }};
}

impl fmt::Display for OperationDocument {
    /// Multi-line GraphQL text, indented with two spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Buffer::with_capacity(256);
        buffer.write_operation(&self.operation)?;
        f.write_str(&buffer.inner)
    }
}

impl fmt::Display for FieldSelection {
    /// Single-line rendering, e.g. `author(first: $first) { id name }`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        write_arguments(f, &self.arguments)?;
        if let Some(selection_set) = &self.selection_set {
            write!(f, " {selection_set}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ {} }}",
            self.items.iter().format_with(" ", |selection, f| match selection {
                Selection::Field(field) => f(field),
                Selection::InlineFragment(fragment) => f(&format_args!(
                    "... on {} {}",
                    fragment.type_condition, fragment.selection_set
                )),
            })
        )
    }
}

fn write_arguments(out: &mut impl Write, arguments: &[Argument]) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    write!(
        out,
        "({})",
        arguments
            .iter()
            .format_with(", ", |argument, f| f(&format_args!(
                "{}: ${}",
                argument.name, argument.variable
            )))
    )
}

struct Buffer {
    inner: String,
    indent: usize,
}

impl std::ops::Deref for Buffer {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::ops::DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Buffer {
    fn with_capacity(capacity: usize) -> Self {
        Buffer {
            inner: String::with_capacity(capacity),
            indent: 0,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.inner.push_str("  ");
        }
    }

    fn write_operation(&mut self, operation: &OperationDefinition) -> fmt::Result {
        write!(self.inner, "{} {}", operation.kind, operation.name)?;

        if !operation.variables.is_empty() {
            write!(
                self.inner,
                "({})",
                operation
                    .variables
                    .iter()
                    .format_with(", ", |variable, f| f(&format_args!("${}: {}", variable.name, variable.ty)))
            )?;
        }

        self.push_str(" {\n");
        self.indent += 1;
        self.write_field(&operation.root_field)?;
        self.indent -= 1;
        self.push('}');

        Ok(())
    }

    fn write_selection_set(&mut self, selection_set: &SelectionSet) -> fmt::Result {
        self.push_str(" {\n");
        self.indent += 1;
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => self.write_field(field)?,
                Selection::InlineFragment(fragment) => {
                    indent_write!(self, "... on {}", fragment.type_condition)?;
                    self.write_selection_set(&fragment.selection_set)?;
                }
            }
        }
        self.indent -= 1;

        indent_write!(self, "}}\n")
    }

    fn write_field(&mut self, field: &FieldSelection) -> fmt::Result {
        indent_write!(self, "{}", field.name)?;
        write_arguments(&mut self.inner, &field.arguments)?;

        match &field.selection_set {
            Some(selection_set) => self.write_selection_set(selection_set),
            None => {
                self.push('\n');
                Ok(())
            }
        }
    }
}
