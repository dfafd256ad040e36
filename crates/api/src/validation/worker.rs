use std::net::SocketAddr;

use validator::ValidationError;

/// 验证Worker ID格式
pub fn validate_worker_id(worker_id: &str) -> Result<(), ValidationError> {
    validate_identifier(worker_id)
}

/// ID只能包含字母、数字、下划线、点和连字符
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::new("ID不能为空"));
    }

    if id.len() > 255 {
        return Err(ValidationError::new("ID长度不能超过255个字符"));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ValidationError::new(
            "ID只能包含字母、数字、下划线、点和连字符",
        ));
    }

    Ok(())
}

/// 验证Worker地址，必须是 host:port 格式
pub fn validate_worker_address(address: &str) -> Result<(), ValidationError> {
    if address.parse::<SocketAddr>().is_ok() {
        return Ok(());
    }

    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(ValidationError::new("Worker地址必须是 host:port 格式"));
    };

    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(ValidationError::new("Worker地址的主机名无效"));
    }

    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok(()),
        _ => Err(ValidationError::new("Worker地址的端口无效")),
    }
}
