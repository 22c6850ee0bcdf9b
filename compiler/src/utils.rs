pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Capitalizes every `_`-separated segment and joins them without separators,
/// so `set_client_DH_params` becomes `SetClientDHParams`.
pub fn class_name(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Turns a raw result type into the name of its abstract base class.
/// `Vector<User>` keeps only `User`, and dots become segment separators.
pub fn sanitize_result(result: &str) -> String {
    let inner = match (result.find('<'), result.rfind('>')) {
        (Some(open), Some(close)) if open < close => &result[open + 1..close],
        _ => result,
    };
    class_name(&inner.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("req_pq"), "ReqPq");
        assert_eq!(class_name("getUser"), "GetUser");
        assert_eq!(class_name("set_client_DH_params"), "SetClientDHParams");
        assert_eq!(class_name(""), "");
    }

    #[test]
    fn test_sanitize_result() {
        assert_eq!(sanitize_result("User"), "User");
        assert_eq!(sanitize_result("Vector<User>"), "User");
        assert_eq!(sanitize_result("updates.State"), "UpdatesState");
        assert_eq!(sanitize_result("Vector<contacts.Link>"), "ContactsLink");
        assert_eq!(sanitize_result("Set_client_DH_params_answer"), "SetClientDHParamsAnswer");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
