use validator::ValidationError;

/// 验证测试名称格式
pub fn validate_test_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("测试名称不能为空"));
    }

    if name.len() > 255 {
        return Err(ValidationError::new("测试名称长度不能超过255个字符"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new("测试名称包含非法字符"));
    }

    Ok(())
}
