//! 错误类型定义

use thiserror::Error;

/// 评估网络计算错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// 输入维度与网络层不匹配
    #[error("Shape mismatch at layer {layer}: expected {expected} inputs, got {actual}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    /// 网络层参数长度与声明的维度不符
    #[error("Invalid layer parameters: {reason}")]
    InvalidLayer { reason: String },

    /// 激活值出现 NaN 或无穷大
    #[error("Non-finite activation at layer {layer}")]
    NonFinite { layer: usize },
}
