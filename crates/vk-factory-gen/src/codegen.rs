// crates/vk-factory-gen/src/codegen.rs

//! Small building blocks for emitting C++ text: naming conventions, function
//! signatures, class definitions and indentation.

use std::fmt::Write;

// --- Naming ---

/// Appended to a struct name to name its factory.
pub const FACTORY_SUFFIX: &str = "Factory";

pub fn factory_name(struct_name: &str) -> String {
    format!("{}{}", struct_name, FACTORY_SUFFIX)
}

pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `sType` -> `setSType`
pub fn setter_name(member: &str) -> String {
    format!("set{}", upper_first(member))
}

/// `sType` -> `getSType`
pub fn getter_name(member: &str) -> String {
    format!("get{}", upper_first(member))
}

/// The private factory field backing a member: `sType` -> `sType_`.
pub fn field_name(member: &str) -> String {
    format!("{}_", member)
}

// --- Text Layout ---

/// Indents every non-empty line of `code` by `depth` levels of two spaces.
pub fn indent(code: &str, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// The comment placed at the top of every generated file.
pub fn generated_header(target: &str) -> String {
    format!(
        "// Generated by vk-factory-gen (target: {}) from the Vulkan API registry.\n\
         // Do not edit this file by hand; regenerate it instead.\n",
        target
    )
}

/// Wraps `code` in a preprocessor conditional that holds when any of
/// `guards` is defined. Without guards the code is returned unchanged.
pub fn protect<S: AsRef<str>>(code: &str, guards: &[S]) -> String {
    match guards {
        [] => code.to_string(),
        [guard] => {
            let guard = guard.as_ref();
            format!("#ifdef {}\n{}#endif  // {}\n", guard, code, guard)
        }
        _ => {
            let condition = guards
                .iter()
                .map(|g| format!("defined({})", g.as_ref()))
                .collect::<Vec<_>>()
                .join(" || ");
            format!("#if {0}\n{1}#endif  // {0}\n", condition, code)
        }
    }
}

// --- Functions ---

/// One `type name` function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub type_name: String,
    pub name: String,
}

impl Argument {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Argument {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// `ret name(type arg, ...)`, without qualifiers or terminator.
pub fn function_signature(name: &str, return_type: &str, args: &[Argument]) -> String {
    let args: Vec<String> = args
        .iter()
        .map(|a| format!("{} {}", a.type_name, a.name))
        .collect();
    if return_type.is_empty() {
        format!("{}({})", name, args.join(", "))
    } else {
        format!("{} {}({})", return_type, name, args.join(", "))
    }
}

/// A member function as declared in a class body and defined out of line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Empty for constructors.
    pub return_type: String,
    pub args: Vec<Argument>,
    pub is_const: bool,
    pub is_override: bool,
    pub body: String,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            return_type: return_type.into(),
            args: Vec::new(),
            is_const: false,
            is_override: false,
            body: String::new(),
        }
    }

    pub fn arg(mut self, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        self.args.push(Argument::new(type_name, name));
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// `ret name(args) const override;`
    pub fn declaration(&self) -> String {
        let mut out = function_signature(&self.name, &self.return_type, &self.args);
        if self.is_const {
            out.push_str(" const");
        }
        if self.is_override {
            out.push_str(" override");
        }
        out.push(';');
        out
    }

    /// The out-of-line definition qualified by `class`.
    pub fn definition(&self, class: &str) -> String {
        let qualified = format!("{}::{}", class, self.name);
        let mut out = function_signature(&qualified, &self.return_type, &self.args);
        if self.is_const {
            out.push_str(" const");
        }
        out.push_str(" {\n");
        out.push_str(&indent(&self.body, 1));
        out.push_str("}\n");
        out
    }
}

// --- Classes ---

/// A C++ class with public methods and private fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDefinition {
    pub name: String,
    pub bases: Vec<String>,
    pub public_declarations: Vec<String>,
    pub methods: Vec<Method>,
    pub private_fields: Vec<Argument>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDefinition {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The class body for a header.
    pub fn declaration(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        write!(out, "class {}", self.name)?;
        if !self.bases.is_empty() {
            let bases: Vec<String> = self.bases.iter().map(|b| format!("public {}", b)).collect();
            write!(out, " : {}", bases.join(", "))?;
        }
        writeln!(out, " {{")?;
        writeln!(out, " public:")?;
        for declaration in &self.public_declarations {
            out.push_str(&indent(declaration, 1));
        }
        for method in &self.methods {
            out.push_str(&indent(&method.declaration(), 1));
        }
        if !self.private_fields.is_empty() {
            writeln!(out)?;
            writeln!(out, " private:")?;
            for field in &self.private_fields {
                writeln!(out, "  {} {};", field.type_name, field.name)?;
            }
        }
        writeln!(out, "}};")?;
        Ok(out)
    }

    /// All out-of-line method definitions, separated by blank lines.
    pub fn definitions(&self) -> String {
        let definitions: Vec<String> = self.methods.iter().map(|m| m.definition(&self.name)).collect();
        definitions.join("\n")
    }
}

/// `class Name : public Base {};`
pub fn exception_declaration(name: &str, base: &str) -> String {
    format!("class {} : public {} {{}};\n", name, base)
}
