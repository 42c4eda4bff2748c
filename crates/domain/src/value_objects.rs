//! # 共通値オブジェクト
//!
//! 複数のエンティティで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 生成時に検証し、不正な値の存在を型レベルで排除
//! - **不変性**: 一度作成したら変更不可
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`Version`] | `u32` | 楽観的ロック用バージョン番号 |
//! | [`MaterialId`] | `String` | 業務上のマテリアル識別子（ワークフローの ID） |
//! | [`MaterialName`] | `String` | マテリアル名 |
//! | [`PlantCode`] | `String` | 担当プラント |
//! | [`ActorId`] | `String` | 操作者の識別子（認証はしない） |
//! | [`QueryQuestion`] | `String` | 問い合わせ本文 |
//! | [`FieldName`] | `String` | 質問票のフィールド名 |
//! | [`StepNumber`] | `u32` | 質問票のステップ番号 |
//! | [`PriorityLevel`] | `u8` | 問い合わせの優先度（1〜5） |

use serde::{Deserialize, Serialize};

use crate::DomainError;

// =========================================================================
// Version（バージョン番号）
// =========================================================================

/// バージョン番号（値オブジェクト）
///
/// 1 から始まり、集約が変更されるたびにインクリメントされる。
/// リポジトリは保存時にこの値で楽観的ロックを行う。
///
/// # 使用例
///
/// ```rust
/// use matflow_domain::value_objects::Version;
///
/// let v1 = Version::initial();
/// assert_eq!(v1.as_u32(), 1);
/// assert_eq!(v1.next().as_u32(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u32);

impl Version {
    /// 初期バージョン（1）を作成する
    pub fn initial() -> Self {
        Self(1)
    }

    /// 指定した値からバージョンを作成する
    ///
    /// # エラー
    ///
    /// 0 の場合は `DomainError::Validation` を返す。
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::Validation(
                "バージョン番号は 1 以上である必要があります".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// 次のバージョンを返す
    ///
    /// # パニック
    ///
    /// u32 の最大値を超える場合はパニックする。
    /// 実運用では到達しない想定。
    pub fn next(&self) -> Self {
        Self(
            self.0
                .checked_add(1)
                .expect("バージョン番号がオーバーフローしました"),
        )
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// =========================================================================
// 文字列系の値オブジェクト
// =========================================================================

/// テキスト値を正規化・検証する
///
/// 前後の空白を除去したうえで、空でないこと・`max_chars` 文字以内であることを確認する。
/// `identifier` が真なら内部の空白も拒否する。文字数は `char` 単位で数える。
pub(crate) fn normalize_text(
    value: String,
    label: &str,
    max_chars: usize,
    identifier: bool,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{label}は必須です")));
    }
    if identifier && trimmed.contains(char::is_whitespace) {
        return Err(DomainError::Validation(format!(
            "{label}に空白は使用できません: {trimmed:?}"
        )));
    }
    let count = trimmed.chars().count();
    if count > max_chars {
        return Err(DomainError::Validation(format!(
            "{label}は {max_chars} 文字以内である必要があります（{count} 文字）"
        )));
    }
    Ok(trimmed.to_string())
}

define_text_value! {
    /// マテリアル ID（値オブジェクト）
    ///
    /// 業務上のマテリアル識別子（例: `CHEM-001`）。
    /// ワークフロー集約の識別子として構築時に割り当てられ、以後変わらない。
    pub struct MaterialId {
        label: "マテリアル ID",
        max_chars: 64,
        identifier: true,
    }
}

define_text_value! {
    /// マテリアル名（値オブジェクト）
    pub struct MaterialName {
        label: "マテリアル名",
        max_chars: 255,
        identifier: false,
    }
}

define_text_value! {
    /// 担当プラント（値オブジェクト）
    pub struct PlantCode {
        label: "担当プラント",
        max_chars: 32,
        identifier: true,
    }
}

define_text_value! {
    /// 操作者 ID（値オブジェクト）
    ///
    /// 呼び出し元から不透明な文字列として渡される。
    /// ドメイン層では認証・認可を行わず、監査用に記録するのみ。
    pub struct ActorId {
        label: "操作者 ID",
        max_chars: 128,
        identifier: true,
    }
}

define_text_value! {
    /// 問い合わせ本文（値オブジェクト）
    pub struct QueryQuestion {
        label: "問い合わせ本文",
        max_chars: 2000,
        identifier: false,
    }
}

define_text_value! {
    /// 質問票のフィールド名（値オブジェクト）
    pub struct FieldName {
        label: "フィールド名",
        max_chars: 128,
        identifier: true,
    }
}

// =========================================================================
// StepNumber（ステップ番号）
// =========================================================================

/// 質問票のステップ番号（値オブジェクト）
///
/// # 不変条件
///
/// - 1 以上
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepNumber(u32);

impl StepNumber {
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::Validation(
                "ステップ番号は 1 以上である必要があります".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StepNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// PriorityLevel（優先度）
// =========================================================================

/// 問い合わせの優先度（値オブジェクト）
///
/// 1（低）〜 5（最高）。未指定時は 3。
/// どの値から「高優先度」とみなすかは [`SlaPolicy`](crate::sla::SlaPolicy) が決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PriorityLevel(u8);

impl PriorityLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// 高優先度とみなす既定の閾値
    pub const HIGH: Self = Self(4);

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            let (min, max) = (Self::MIN, Self::MAX);
            return Err(DomainError::Validation(format!(
                "優先度は {min} 〜 {max} の範囲である必要があります（指定値: {value}）"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}
