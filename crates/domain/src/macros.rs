/// エンティティ ID 型（UUID v7）を定義する
///
/// 生成される型は作成順に並ぶ（UUID v7 は時刻順）。
/// 文字列からの復元は `FromStr` で行い、失敗時は `DomainError::Validation` を返す。
///
/// ```rust
/// use matflow_domain::workflow::QueryId;
///
/// let id = QueryId::new();
/// assert_eq!(id.to_string().parse::<QueryId>().unwrap(), id);
/// assert!(
///     "not-a-uuid"
///         .parse::<QueryId>()
///         .unwrap_err()
///         .to_string()
///         .contains("QueryId の形式が不正です")
/// );
/// ```
macro_rules! define_entity_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::str::FromStr for $Name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    let name = stringify!($Name);
                    $crate::DomainError::Validation(format!("{name} の形式が不正です: {e}"))
                })
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// 正規化済みテキストの値オブジェクトを定義する
///
/// 構築時に [`normalize_text`](crate::value_objects::normalize_text) で
/// 前後の空白除去・必須チェック・文字数チェックを行う。
/// `identifier: true` の型は内部に空白を含められない。
///
/// ```rust
/// use matflow_domain::value_objects::{MaterialId, MaterialName};
///
/// assert_eq!(MaterialId::new("  CHEM-001 ").unwrap().as_str(), "CHEM-001");
/// assert!(MaterialId::new("CHEM 001").is_err());
/// assert!(MaterialName::new("Isopropyl alcohol").is_ok());
/// ```
macro_rules! define_text_value {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:literal,
            max_chars: $max_chars:expr,
            identifier: $identifier:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        $vis struct $Name(String);

        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                $crate::value_objects::normalize_text(value.into(), $label, $max_chars, $identifier)
                    .map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$Name> for String {
            fn from(value: $Name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}
