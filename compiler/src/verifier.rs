use lazy_static::lazy_static;
use regex::Regex;
use crate::error::TlError;

lazy_static! {
    static ref TRUE_FLAG_RX: Regex = Regex::new(r" \w+:flags\.\d+\?true\b").unwrap();
}

/// Primitives every layer shares. They are never generated from a schema.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreType {
    BoolFalse = 0xbc799737,
    BoolTrue  = 0x997275b5,
    True      = 0x3fedd339,
    Vector    = 0x1cb5c415,
}

impl CoreType {
    pub const ALL: [CoreType; 4] = [
        CoreType::BoolFalse,
        CoreType::BoolTrue,
        CoreType::True,
        CoreType::Vector,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<CoreType> {
        CoreType::ALL.into_iter().find(|core| core.id() == id)
    }
}

/// Written before the element count of a boxed vector.
pub const VECTOR_ID: u32 = CoreType::Vector as u32;

/// Matched by ID so a schema type that reuses one of the names is kept.
pub fn is_core_type(id: u32) -> bool {
    CoreType::from_id(id).is_some()
}

/// Rewrites a canonical declaration into the text the ID is computed over:
/// `bytes` reads as `string`, generic and vector punctuation is dropped,
/// and `flags.N?true` arguments disappear.
pub fn normalize(canonical: &str) -> String {
    let text = canonical
        .replace(":bytes ", ":string ")
        .replace("?bytes ", "?string ")
        .replace('<', " ")
        .replace('>', "")
        .replace('{', "")
        .replace('}', "");
    TRUE_FLAG_RX.replace_all(&text, "").into_owned()
}

/// CRC-32 of the normalized canonical form.
pub fn infer_id(canonical: &str) -> u32 {
    crc32fast::hash(normalize(canonical).as_bytes())
}

/// Fails when an explicitly declared ID disagrees with the inferred one.
pub fn check_identity(name: &str, declared: u32, inferred: u32) -> Result<(), TlError> {
    if declared != inferred {
        return Err(TlError::IdentityMismatch {
            name: name.to_string(),
            declared,
            inferred,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_types() {
        assert!(is_core_type(0xbc799737));
        assert!(is_core_type(0x997275b5));
        assert!(is_core_type(0x3fedd339));
        assert!(is_core_type(VECTOR_ID));
        assert!(!is_core_type(0x60469778));
        assert_eq!(CoreType::from_id(0x1cb5c415), Some(CoreType::Vector));
    }

    #[test]
    fn test_infer_core_ids() {
        assert_eq!(infer_id("boolFalse = Bool"), CoreType::BoolFalse.id());
        assert_eq!(infer_id("boolTrue = Bool"), CoreType::BoolTrue.id());
        assert_eq!(infer_id("true = True"), CoreType::True.id());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("users.getUsers id:Vector<InputUser> = Vector<User>"),
            "users.getUsers id:Vector InputUser = Vector User"
        );
        assert_eq!(normalize("a data:bytes = X"), "a data:string = X");
        assert_eq!(
            normalize("invokeWithLayer {X:Type} layer:int query:!X = X"),
            "invokeWithLayer X:Type layer:int query:!X = X"
        );
        assert_eq!(
            normalize("a flags:# silent:flags.5?true d:flags.0?bytes = X"),
            "a flags:# d:flags.0?string = X"
        );
    }

    #[test]
    fn test_infer_known_ids() {
        assert_eq!(infer_id("users.getUsers id:Vector<InputUser> = Vector<User>"), 0x0d91a548);
        assert_eq!(infer_id("msgs_ack msg_ids:Vector<long> = MsgsAck"), 0x62d6b459);
        assert_eq!(infer_id("invokeWithLayer {X:Type} layer:int query:!X = X"), 0xda9b0d0d);
    }

    #[test]
    fn test_true_flags_elided() {
        assert_eq!(
            infer_id("a x:int flags:# b:flags.0?true = X"),
            infer_id("a x:int flags:# = X")
        );
        assert_eq!(infer_id("a x:int flags:# = X"), 0xcd604b26);
    }

    #[test]
    fn test_check_identity() {
        assert!(check_identity("ping", 1, 1).is_ok());
        assert!(matches!(
            check_identity("ping", 1, 2),
            Err(TlError::IdentityMismatch { declared: 1, inferred: 2, .. })
        ));
    }
}
