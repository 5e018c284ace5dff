//! ユーティリティモジュール

/// 割込み制御と割込み安全なロック
pub mod irq;

/// ロギング
pub mod log;
