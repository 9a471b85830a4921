//! 文档索引模块
//!
//! 书籍的正文由宿主渲染器生成，组装流程只通过文档索引
//! 查询每个包内路径对应的文档元信息（标识符、标题、子章节声明等）。
//! 此模块定义索引的协作接口，并提供一个内存实现供CLI和测试使用。

use crate::epub::error::{EpubError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 文档索引中的一条文档记录
///
/// 字段来自文档的front matter声明，组装流程不修改这些声明，
/// 只会向`text`字段追加渲染好的导航标记。
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    /// 文档声明的唯一标识符
    pub id: String,
    /// 文档标题
    pub title: String,
    /// 副标题(可选)
    #[serde(default)]
    pub subtitle: Option<String>,
    /// 声明的子章节引用列表(可选)
    #[serde(default)]
    pub sections: Option<Vec<String>>,
    /// 目录类型(如"toc")
    #[serde(default)]
    pub toc_type: Option<String>,
    /// 是否为阅读起点
    #[serde(default)]
    pub toc_start: Option<bool>,
    /// 渲染后的文档文本，导航标记会追加到这里
    #[serde(default)]
    pub text: String,
}

/// 文档索引协作接口
///
/// 由宿主提供实现；组装流程只做两件事：按包内路径查找记录，
/// 以及把渲染好的导航标记追加到目录文档的文本中。
pub trait DocumentIndex {
    /// 按包内路径查找文档记录
    fn lookup(&self, urlpath: &str) -> Option<&DocumentRecord>;

    /// 向指定文档的文本字段追加渲染内容
    fn append_text(&mut self, urlpath: &str, markup: &str);
}

/// 基于HashMap的内存文档索引
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: HashMap<String, DocumentRecord>,
}

impl MemoryIndex {
    /// 创建空的内存索引
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    /// 插入一条文档记录
    pub fn insert(&mut self, urlpath: impl Into<String>, record: DocumentRecord) {
        self.documents.insert(urlpath.into(), record);
    }

    /// 从YAML文件加载文档索引
    ///
    /// 文件内容为"包内路径 -> 文档记录"的映射。
    ///
    /// # 参数
    /// * `path` - YAML索引文件路径
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| EpubError::ConfigError(format!("无法读取文档索引文件: {}", e)))?;

        let documents: HashMap<String, DocumentRecord> = serde_yml::from_str(&content)
            .map_err(|e| EpubError::ConfigError(format!("文档索引文件格式错误: {}", e)))?;

        Ok(Self { documents })
    }

    /// 索引中的文档数量
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// 索引是否为空
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentIndex for MemoryIndex {
    fn lookup(&self, urlpath: &str) -> Option<&DocumentRecord> {
        self.documents.get(urlpath)
    }

    fn append_text(&mut self, urlpath: &str, markup: &str) {
        if let Some(record) = self.documents.get_mut(urlpath) {
            record.text.push_str(markup);
        }
    }
}
