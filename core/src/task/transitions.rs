//! 任务状态转换规则和验证

use super::types::TaskStatus;
use crate::error::TransitionError;

/// 状态转换
pub struct StateTransition;

impl StateTransition {
    /// 验证状态转换是否合法
    pub fn validate(from: TaskStatus, to: TaskStatus) -> Result<(), TransitionError> {
        // 终态不能转换
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        if Self::successors(from).contains(&to) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    /// 合法的后继状态
    pub fn successors(from: TaskStatus) -> &'static [TaskStatus] {
        match from {
            TaskStatus::Created => &[TaskStatus::Registered],
            TaskStatus::Registered => &[TaskStatus::Pending],
            TaskStatus::Pending => &[TaskStatus::Running],
            TaskStatus::Running => &[
                TaskStatus::Success,
                TaskStatus::Failed,
                TaskStatus::Retrying,
            ],
            TaskStatus::Retrying => &[TaskStatus::Running],
            TaskStatus::Success | TaskStatus::Failed => &[],
        }
    }

    /// 判断是否为终态
    pub fn is_terminal(status: TaskStatus) -> bool {
        matches!(status, TaskStatus::Success | TaskStatus::Failed)
    }

    /// 获取状态的可读描述
    pub fn status_description(status: TaskStatus) -> &'static str {
        match status {
            TaskStatus::Created => "created, not yet registered",
            TaskStatus::Registered => "registered, awaiting environment setup",
            TaskStatus::Pending => "ready to execute",
            TaskStatus::Running => "attempt in progress",
            TaskStatus::Success => "finished with a result",
            TaskStatus::Failed => "finished with an error",
            TaskStatus::Retrying => "waiting before the next attempt",
        }
    }
}
