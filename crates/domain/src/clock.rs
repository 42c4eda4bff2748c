//! # 時刻
//!
//! ドメイン操作はすべて呼び出し側から `now` を受け取る。
//! ユースケース層は [`Clock`] 経由で現在時刻を得る。
//!
//! 経過日数や更新日時の単調増加など、時刻に関する規則もここにまとめる。

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 常に同じ時刻を返す（テスト・バッチの再実行用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// 直前の更新日時より必ず後になる更新日時を返す
///
/// `now` が `previous` 以前（同一時刻を含む）の場合は `previous + 1µs` を返す。
pub(crate) fn advance_strictly(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// 2 時点間の経過日数（切り捨て、負にならない）
pub(crate) fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().max(0)
}
