//! # Error 模块
//!
//! 定义 photo-transition 中使用的错误类型。
//!
//! 转场引擎本身不向调用方返回错误：缺失的视图、被拒绝的重入手势都建模为状态。
//! 这里的错误只出现在配置加载、动画系统的误用和手势回放脚本上。

use thiserror::Error;

use crate::animation::ObjectId;

/// 动画系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 对象未注册，或已被宿主释放
    #[error("对象 {object_id} 未注册或已释放")]
    ObjectNotFound { object_id: ObjectId },

    /// 注册类型与请求类型不一致
    #[error("对象 {object_id} 类型不匹配")]
    TypeMismatch { object_id: ObjectId },

    /// 对象没有该属性
    #[error("对象 {object_id} 上不存在属性 '{property}'")]
    UnknownProperty {
        object_id: ObjectId,
        property: &'static str,
    },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// 手势回放错误
#[derive(Error, Debug)]
pub enum ReplayError {
    /// 脚本解析失败
    #[error("手势脚本解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 脚本内容无效
    #[error("手势脚本无效: {0}")]
    InvalidScript(String),

    /// 回放在帧数上限内没有回到 Idle
    #[error("回放在 {frames} 帧内未结束")]
    DidNotSettle { frames: usize },
}
