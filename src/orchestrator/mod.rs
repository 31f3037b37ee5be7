//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把各业务能力按固定顺序串成一条线性流水线，并负责把失败映射为
//! 面向调用方的响应。
//!
//! ## 层次关系
//!
//! ```text
//! app (HTTP 表单 ↔ GenerateRequest/GenerateResponse)
//!     ↓
//! orchestrator::ExamFlow (一次出卷请求的完整流程)
//!     ↓
//! services (能力层：extract / generate / artifact)
//!     ↓
//! parser / renderer (纯函数核心)
//! ```
//!
//! ## 设计原则
//!
//! 1. **线性无分支循环**：每个请求顺序执行一遍，没有重试状态
//! 2. **失败就地降级**：除两个显式终止外，一切失败都收敛为更空的结果
//! 3. **能力注入**：生成能力通过 `GenerationPort` 注入，便于离线测试

pub mod exam_flow;

pub use exam_flow::ExamFlow;
