use crate::{
    grouping::{Artifact, Declaration},
    source_builder::SourceBuilder,
    types::{Argument, Layer},
    utils::sanitize_result,
    verifier::VECTOR_ID,
};

pub const AUTO_GEN_NOTICE: &str =
    "// File generated by the TL object generator. All changes will be ERASED";

const INCLUDES: [&str; 5] = [
    "#include <optional>",
    "#include <string>",
    "#include <vector>",
    "#include <stdint.h>",
    "#include \"../stream.cpp\"",
];

/// Namespace holding the abstract base classes of `layer`.
fn abstract_prefix(layer: Layer) -> String {
    format!("TL::Type::L{}::", layer)
}

/// Maps a field to its C++ type. Optional wraps first, vector wraps last.
fn map_type(arg: &Argument, prefix: &str) -> String {
    let cpp_type = if arg.is_generic() {
        "Serializable".to_string()
    } else {
        match arg.type_name().unwrap_or_default() {
            "int"           => "int32_t".to_string(),
            "long"          => "int64_t".to_string(),
            "string"        => "std::string".to_string(),
            "bytes"         => "std::vector<uint8_t>".to_string(),
            "Bool" | "true" => "bool".to_string(),
            other           => format!("{}{}", prefix, sanitize_result(other)),
        }
    };

    let cpp_type = if arg.is_flag() {
        format!("std::optional<{}>", cpp_type)
    } else {
        cpp_type
    };

    if arg.is_vector() {
        format!("std::vector<{}>", cpp_type)
    } else {
        cpp_type
    }
}

fn type_and_name(arg: &Argument, prefix: &str) -> String {
    format!("{} {}", map_type(arg, prefix), arg.name())
}

/// Renders one generated file: abstract bases per layer, then one class per
/// declaration inside `TL::L<layer>[::<namespace>]`.
pub fn generate_source(artifact: &Artifact<'_>) -> String {
    let mut b = SourceBuilder::new(4);

    b.writeln(AUTO_GEN_NOTICE);
    for include in INCLUDES {
        b.writeln(include);
    }
    b.blank_line();
    b.writeln("namespace TL {");

    b.writeln("namespace Type {");
    for (layer, abstracts) in &artifact.abstracts {
        b.writeln(&format!("namespace L{} {{", layer));
        for name in abstracts {
            b.writeln(&format!("class {} : public Serializable {{ }};", name));
        }
        b.end_block();
    }
    b.end_block();

    for (layer, namespaces) in &artifact.layers {
        b.writeln(&format!("namespace L{} {{", layer));
        for (namespace, declarations) in namespaces {
            if let Some(ns) = namespace {
                b.writeln(&format!("namespace {} {{", ns));
            }
            for declaration in declarations {
                write_class(declaration, &mut b);
            }
            if namespace.is_some() {
                b.end_block();
            }
        }
        b.end_block();
    }

    b.end_block();
    b.finish()
}

fn write_class(declaration: &Declaration<'_>, b: &mut SourceBuilder) {
    let object = declaration.object;
    let class_name = &declaration.class_name;
    let prefix = abstract_prefix(object.layer());
    let fields = object.data_fields();

    b.writeln(&format!(
        "class {} : public {}{} {{",
        class_name, prefix, declaration.base_name
    ));
    b.writeln_outdented("public:");
    b.writeln(&format!("static const uint32_t CONSTRUCTOR = {:#x};", object.id()));
    b.blank_line();

    for arg in &fields {
        b.writeln(&format!("{};", type_and_name(arg, &prefix)));
    }

    // Flag-gated and inferable fields come last, so callers may leave them out.
    let params: Vec<String> = fields
        .iter()
        .map(|arg| {
            if arg.is_flag() || arg.can_be_inferred() {
                format!("{} = {{}}", type_and_name(arg, &prefix))
            } else {
                type_and_name(arg, &prefix)
            }
        })
        .collect();

    b.blank_line();
    b.writeln(&format!("{}({}) {{", class_name, params.join(", ")));
    for arg in &fields {
        b.writeln(&format!("this->{0} = {0};", arg.name()));
    }
    b.end_block();

    b.writeln("void write(const OutputStream& stream) override {");
    b.writeln(&format!("stream << {}::CONSTRUCTOR;", class_name));
    for arg in &fields {
        if arg.is_vector() {
            if arg.use_vector_id() {
                b.writeln(&format!("stream << {:#x};", VECTOR_ID));
            }
            b.writeln(&format!("stream << static_cast<uint32_t>({}.size());", arg.name()));
            b.writeln(&format!("for (auto const& _x: {}) {{", arg.name()));
            b.writeln("stream << _x;");
            b.end_block();
        } else {
            b.writeln(&format!("stream << {};", arg.name()));
        }
    }
    b.end_block();

    b.writeln("void read(const OutputStream& stream) override {");
    if fields.iter().any(|arg| arg.is_vector()) {
        b.writeln("uint32_t _len, _i;");
    }
    for arg in &fields {
        if arg.is_vector() {
            if arg.use_vector_id() {
                b.writeln("stream >> _i;");
            }
            b.writeln("stream >> _len;");
            b.writeln("for (_i = 0; _i != _len; ++_i) {");
            b.writeln("/* TODO: element deserialization is not generated */");
            b.end_block();
        } else {
            b.writeln(&format!("stream >> {};", arg.name()));
        }
    }
    b.end_block();

    b.end_block_with(";");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_objects;
    use crate::parser::parse_declaration;
    use crate::types::Object;

    fn function(line: &str) -> Object {
        parse_declaration(line, 71, true).unwrap()
    }

    fn field_type(line: &str, field: &str) -> String {
        let object = function(line);
        let arg = object
            .arguments()
            .iter()
            .find(|a| a.name() == field)
            .unwrap()
            .clone();
        map_type(&arg, &abstract_prefix(71))
    }

    #[test]
    fn test_map_type() {
        let line = "a x:int y:long s:string b:bytes t:Bool p:InputPeer st:updates.State \
                    v:Vector<long> o:flags.0?int ov:flags.1?vector<InputPeer> flags:# q:!X = X;";
        assert_eq!(field_type(line, "x"), "int32_t");
        assert_eq!(field_type(line, "y"), "int64_t");
        assert_eq!(field_type(line, "s"), "std::string");
        assert_eq!(field_type(line, "b"), "std::vector<uint8_t>");
        assert_eq!(field_type(line, "t"), "bool");
        assert_eq!(field_type(line, "p"), "TL::Type::L71::InputPeer");
        assert_eq!(field_type(line, "st"), "TL::Type::L71::UpdatesState");
        assert_eq!(field_type(line, "v"), "std::vector<int64_t>");
        assert_eq!(field_type(line, "o"), "std::optional<int32_t>");
        assert_eq!(
            field_type(line, "ov"),
            "std::vector<std::optional<TL::Type::L71::InputPeer>>"
        );
        assert_eq!(field_type(line, "q"), "Serializable");
    }

    #[test]
    fn test_generate_class() {
        let objects = vec![function("getUser#fa7de60f id:int = User;")];
        let grouped = group_objects(&objects);
        let source = generate_source(&grouped.functions);

        let expected = "\
namespace TL {
    namespace Type {
        namespace L71 {
            class User : public Serializable { };
        }
    }
    namespace L71 {
        class GetUser : public TL::Type::L71::User {
        public:
            static const uint32_t CONSTRUCTOR = 0xfa7de60f;

            int32_t id;

            GetUser(int32_t id) {
                this->id = id;
            }
            void write(const OutputStream& stream) override {
                stream << GetUser::CONSTRUCTOR;
                stream << id;
            }
            void read(const OutputStream& stream) override {
                stream >> id;
            }
        };
    }
}
";
        assert!(source.starts_with(AUTO_GEN_NOTICE));
        assert!(source.contains("#include \"../stream.cpp\"\n\n"));
        assert!(source.ends_with(expected), "unexpected output:\n{}", source);
    }

    #[test]
    fn test_generate_namespaced_class() {
        let objects = vec![function("updates.getState#edd4882a = updates.State;")];
        let grouped = group_objects(&objects);
        let source = generate_source(&grouped.functions);
        assert!(source.contains("class UpdatesState : public Serializable { };"));
        assert!(source.contains("namespace updates {"));
        assert!(source.contains("class GetState : public TL::Type::L71::UpdatesState {"));
        assert!(source.contains("GetState() {"));
    }

    #[test]
    fn test_constructor_order_and_defaults() {
        let objects = vec![function("send a:int flags:# random_id:long b:flags.0?string = Updates;")];
        let grouped = group_objects(&objects);
        let source = generate_source(&grouped.functions);
        assert!(
            source.contains("Send(int32_t a, int64_t random_id = {}, std::optional<std::string> b = {}) {"),
            "unexpected output:\n{}",
            source
        );
        assert!(!source.contains(" flags;"));
    }

    #[test]
    fn test_random_id_after_flag_has_default() {
        let objects = vec![function("send flags:# silent:flags.0?true random_id:long = Updates;")];
        let grouped = group_objects(&objects);
        let source = generate_source(&grouped.functions);
        assert!(
            source.contains("Send(std::optional<bool> silent = {}, int64_t random_id = {}) {"),
            "unexpected output:\n{}",
            source
        );
    }

    #[test]
    fn test_vector_tagging() {
        let objects = vec![
            function("boxed ids:Vector<long> = BoxedResult;"),
            function("bare ids:vector<long> = BareResult;"),
        ];
        let grouped = group_objects(&objects);
        let source = generate_source(&grouped.functions);

        let boxed = &source[source.find("class Boxed ").unwrap()..];
        let boxed_write = &boxed[boxed.find("void write").unwrap()..boxed.find("void read").unwrap()];
        assert!(boxed_write.contains("stream << 0x1cb5c415;\n"));
        assert!(
            boxed_write.find("0x1cb5c415").unwrap()
                < boxed_write.find("static_cast<uint32_t>(ids.size())").unwrap()
        );
        let boxed_read = &boxed[boxed.find("void read").unwrap()..];
        assert!(boxed_read.contains("stream >> _i;"));
        assert!(boxed_read.contains("/* TODO: element deserialization is not generated */"));

        let bare = &source[source.find("class Bare ").unwrap()..source.find("class Boxed ").unwrap()];
        assert!(!bare.contains("0x1cb5c415"));
        assert!(!bare.contains("stream >> _i;"));
        assert!(bare.contains("stream << static_cast<uint32_t>(ids.size());"));
    }
}
