use std::fmt;
use serde::Serialize;
use crate::{
    error::TlError,
    tokenizer::{tokenize_type, TypeToken},
    utils::class_name,
    verifier::{check_identity, infer_id, is_core_type},
};

/// Protocol schema version an object was declared under.
pub type Layer = u32;

/// One `name:type` pair of a declaration, with its type grammar resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    name:               String,
    #[serde(rename = "type")]
    type_:              Option<String>,
    is_vector:          bool,
    use_vector_id:      bool,
    flag_index:         Option<u8>,
    is_generic:         bool,
    flag_indicator:     bool,
    generic_definition: bool,
    can_be_inferred:    bool,
}

impl Argument {
    /// Resolves `type_text` into the argument's grammar attributes.
    /// `generic_definition` is set for `{X:Type}` arguments.
    pub fn new(name: &str, type_text: &str, generic_definition: bool) -> Result<Argument, TlError> {
        let name = if name == "self" { "is_self" } else { name };

        let mut arg = Argument {
            name:               name.to_string(),
            type_:              None,
            is_vector:          false,
            use_vector_id:      false,
            flag_index:         None,
            is_generic:         false,
            flag_indicator:     false,
            generic_definition,
            can_be_inferred:    name == "random_id",
        };

        let mut bare_element = false;
        for token in tokenize_type(type_text)? {
            match token {
                TypeToken::FlagIndicator => arg.flag_indicator = true,
                TypeToken::GenericRef    => arg.is_generic = true,
                TypeToken::FlagGate(i)   => arg.flag_index = Some(i),
                TypeToken::Vector { boxed, bare } => {
                    arg.is_vector = true;
                    arg.use_vector_id = boxed;
                    bare_element = bare;
                }
                TypeToken::Name(n) => {
                    arg.type_ = Some(if bare_element { n.to_lowercase() } else { n.to_string() });
                }
            }
        }

        Ok(arg)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying type with every grammar marker stripped.
    /// `None` only for the flag indicator.
    pub fn type_name(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    pub fn is_vector(&self) -> bool {
        self.is_vector
    }

    /// Each vector element carries its own constructor ID on the wire.
    pub fn use_vector_id(&self) -> bool {
        self.use_vector_id
    }

    pub fn is_flag(&self) -> bool {
        self.flag_index.is_some()
    }

    pub fn flag_index(&self) -> Option<u8> {
        self.flag_index
    }

    pub fn is_generic(&self) -> bool {
        self.is_generic
    }

    pub fn flag_indicator(&self) -> bool {
        self.flag_indicator
    }

    pub fn generic_definition(&self) -> bool {
        self.generic_definition
    }

    pub fn can_be_inferred(&self) -> bool {
        self.can_be_inferred
    }

    /// Indicators and generic definitions describe the grammar, not data.
    pub fn is_data_field(&self) -> bool {
        !self.flag_indicator && !self.generic_definition
    }

    /// Rendering used for ID inference, where `date` is an alias of `int`.
    pub fn canonical(&self) -> String {
        self.render(true)
    }

    fn render(&self, canonical: bool) -> String {
        let base = match self.type_.as_deref() {
            Some("date") if canonical && !self.is_vector && !self.is_generic => "int",
            Some(t) if !self.flag_indicator => t,
            _ => "#",
        };

        let mut real_type = base.to_string();
        if self.is_vector {
            let wrapper = if self.use_vector_id { "Vector" } else { "vector" };
            real_type = format!("{}<{}>", wrapper, real_type);
        }
        if self.is_generic {
            real_type = format!("!{}", real_type);
        }
        if let Some(index) = self.flag_index {
            real_type = format!("flags.{}?{}", index, real_type);
        }

        if self.generic_definition {
            format!("{{{}:{}}}", self.name, real_type)
        } else {
            format!("{}:{}", self.name, real_type)
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// A schema type or function. Only built through [`Object::new`], which
/// guarantees `id` agrees with the canonical form (except for `vector`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    namespace:   Option<String>,
    name:        String,
    id:          u32,
    arguments:   Vec<Argument>,
    result:      String,
    layer:       Layer,
    is_function: bool,
}

impl Object {
    /// Builds an object from `namespace.name` (namespace optional).
    /// Without `id` the canonical ID is inferred; with one it is verified.
    pub fn new(
        fullname:    &str,
        id:          Option<u32>,
        arguments:   Vec<Argument>,
        result:      impl Into<String>,
        layer:       Layer,
        is_function: bool,
    ) -> Result<Object, TlError> {
        let (namespace, name) = match fullname.split_once('.') {
            Some((_, name)) if name.contains('.') => {
                return Err(TlError::grammar(format!("Nested namespace in {:?}", fullname)));
            }
            Some((ns, name)) => (Some(ns.to_string()), name.to_string()),
            None => (None, fullname.to_string()),
        };

        let mut object = Object {
            namespace,
            name,
            id: 0,
            arguments,
            result: result.into(),
            layer,
            is_function,
        };

        let canonical = object.canonical();
        if !canonical.is_ascii() {
            return Err(TlError::grammar(format!("Non-ASCII declaration {:?}", canonical)));
        }

        let inferred = infer_id(&canonical);
        object.id = match id {
            None => inferred,
            Some(declared) => {
                if object.name != "vector" {
                    check_identity(&object.fullname(), declared, inferred)?;
                }
                declared
            }
        };
        Ok(object)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// The result type exactly as written in the schema.
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn is_function(&self) -> bool {
        self.is_function
    }

    /// Recomputes the canonical ID from the declaration itself.
    pub fn infer_id(&self) -> u32 {
        infer_id(&self.canonical())
    }

    pub fn is_core_type(&self) -> bool {
        is_core_type(self.id)
    }

    pub fn class_name(&self) -> String {
        class_name(&self.name)
    }

    /// Arguments with flag-gated and inferable ones moved last, relative
    /// order kept within both groups.
    pub fn sorted_arguments(&self) -> Vec<&Argument> {
        let mut args: Vec<&Argument> = self.arguments.iter().collect();
        args.sort_by_key(|a| a.is_flag() || a.can_be_inferred());
        args
    }

    /// The fields a generated class carries, in constructor order.
    pub fn data_fields(&self) -> Vec<&Argument> {
        self.sorted_arguments()
            .into_iter()
            .filter(|a| a.is_data_field())
            .collect()
    }

    /// `[ns.]name args = result`, without the ID.
    pub fn canonical(&self) -> String {
        let mut text = self.fullname();
        for arg in &self.arguments {
            text.push(' ');
            text.push_str(&arg.canonical());
        }
        text.push_str(" = ");
        text.push_str(&self.result);
        text
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:08x}", self.fullname(), self.id)?;
        for arg in &self.arguments {
            write!(f, " {}", arg.canonical())?;
        }
        write!(f, " = {}", self.result)
    }
}
