//! 引用路径重写模块
//!
//! 提供文档内引用在打包布局下的重写与解析功能。
//! 书籍内的文档最终都以相对路径互相引用，因此以`/`开头的
//! 绝对引用需要根据引用文档自身所在的目录深度改写为相对形式。

use crate::epub::error::{EpubError, Result};

/// 判断引用是否指向书籍包外部
///
/// 带有协议前缀(如`http:`)或网络位置前缀(`//`)的引用视为外部引用。
pub fn is_external(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }

    // 协议前缀: 字母开头，后跟字母/数字/+/-/.，以冒号结束
    let mut chars = reference.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
            return false;
        }
    }
    false
}

/// 获取路径的父目录
///
/// 根目录下的文件返回`.`，与原始路径语义保持一致。
fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => ".",
    }
}

/// 计算引用文档到书籍包根目录的相对前缀
///
/// 文档每深入一层目录，前缀就增加一个`../`；
/// 位于根目录的文档返回`./`，而不是空字符串。
pub fn relative_prefix_to_root(document_path: &str) -> String {
    let mut prefix = String::new();
    let mut parent = parent_dir(document_path);
    while parent != "." && !parent.is_empty() {
        prefix.push_str("../");
        parent = parent_dir(parent);
    }

    if prefix.is_empty() {
        "./".to_string()
    } else {
        prefix
    }
}

/// 规范化路径，折叠`.`与`..`段
///
/// 纯字符串运算，不访问文件系统。超出起点的`..`段会被保留，
/// 以便根目录前缀的计算结果保持可逆。
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&"..")) || segments.is_empty() {
                    segments.push("..");
                } else {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// 将文档内的引用重写为打包后可用的相对引用
///
/// # 参数
/// * `reference` - 文档中出现的原始引用
/// * `document_path` - 引用所在文档的包内路径
/// * `allow_external` - 是否允许指向包外部的引用
///
/// # 返回值
/// * `Result<String, EpubError>` - 重写后的引用
///
/// # 规则
/// * 外部引用在允许时原样返回，否则报错
/// * 以`/`开头的包内绝对引用改写为相对于引用文档目录的路径
/// * 已经是相对形式的引用原样返回
pub fn rewrite_reference(
    reference: &str,
    document_path: &str,
    allow_external: bool,
) -> Result<String> {
    if is_external(reference) {
        if allow_external {
            return Ok(reference.to_string());
        }
        return Err(EpubError::ExternalReference(reference.to_string()));
    }

    if let Some(stripped) = reference.strip_prefix('/') {
        // 前缀对根目录文档是`./`而非空串，规范化会再把它折叠掉，
        // 使改写结果与扫描得到的相对路径逐字一致
        let prefix = relative_prefix_to_root(document_path);
        Ok(normalize(&format!("{}{}", prefix, stripped)))
    } else {
        Ok(reference.to_string())
    }
}

/// 将引用解析为文档索引的查找键
///
/// 与[`rewrite_reference`]不同，此函数不做打包布局的改写，
/// 只是把相对引用合并到引用文档所在目录之上，得到完整的包内路径。
/// 外部引用在此场景下一律报错。
pub fn resolve_against(reference: &str, document_path: &str) -> Result<String> {
    if is_external(reference) {
        return Err(EpubError::ExternalReference(reference.to_string()));
    }

    if reference.starts_with('/') {
        Ok(reference.to_string())
    } else {
        let dir = parent_dir(document_path);
        Ok(normalize(&format!("{}/{}", dir, reference)))
    }
}
