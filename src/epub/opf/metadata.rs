//! 书籍元数据模块
//!
//! 定义书籍级别的元数据结构，对应用户提供的YAML元数据文件。
//! 元数据在构建过程中归构建流程所有，校验和目录遍历会就地补全其中的字段。

use crate::epub::error::{EpubError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 标识符信息
#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    /// 标识符值(如"urn:isbn:..."、"urn:uuid:...")
    pub value: String,
    /// 标识符类型(如ISBN、UUID等)
    #[serde(default)]
    pub scheme: Option<String>,
    /// 是否为书籍包的唯一标识符
    #[serde(default)]
    pub unique: bool,
}

/// 出版时间信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Published {
    /// 出版日期(W3C格式)，缺省时由校验步骤填入当前时间
    #[serde(default)]
    pub date: Option<String>,
    /// 修改日期(W3C格式)，校验步骤总是刷新为当前时间
    #[serde(default)]
    pub modified: Option<String>,
}

/// 对包内某个文件的引用(如目录文档、NCX文档)
#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    /// 清单项ID
    #[serde(default)]
    pub id: String,
    /// 文件的包内路径
    pub href: String,
}

/// 封面页生成配置
#[derive(Debug, Clone, Deserialize)]
pub struct CoverPage {
    /// 封面页的清单项ID
    pub id: String,
    /// 封面页的包内路径
    pub href: String,
}

/// 封面配置
#[derive(Debug, Clone, Deserialize)]
pub struct Cover {
    /// 封面图片的清单项ID
    pub id_image: String,
    /// 封面图片的包内路径
    pub src: String,
    /// 封面图片的媒体类型
    pub media_type: String,
    /// 封面图片的替代文本
    #[serde(default)]
    pub alt: Option<String>,
    /// 若配置则生成内联的XHTML封面页
    #[serde(default)]
    pub write_html: Option<CoverPage>,
}

/// 书籍级别声明的头部资源(样式表或脚本)
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderAsset {
    /// 清单项ID
    pub id: String,
    /// 资源引用，允许指向包外部
    pub href: String,
}

/// 书籍元数据
///
/// 对应原始YAML元数据文件的全部内容，是整个构建流程的输入。
#[derive(Debug, Clone, Deserialize)]
pub struct BookMetadata {
    /// 书名
    pub title: String,
    /// 语言列表
    #[serde(default)]
    pub languages: Vec<String>,
    /// 标识符列表，校验后恰好有一个标记为唯一
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
    /// 出版时间信息
    #[serde(default)]
    pub published: Published,
    /// 主题列表
    #[serde(default)]
    pub subjects: Vec<String>,
    /// 描述
    #[serde(default)]
    pub description: Option<String>,
    /// 创建者列表
    #[serde(default)]
    pub creators: Vec<String>,
    /// 贡献者列表
    #[serde(default)]
    pub contributors: Vec<String>,
    /// 出版社
    #[serde(default)]
    pub publisher: Option<String>,
    /// 版权信息
    #[serde(default)]
    pub rights: Option<String>,
    /// 封面配置(可选)
    #[serde(default)]
    pub cover: Option<Cover>,
    /// 兼容旧阅读器的NCX导航文档(可选)
    #[serde(default)]
    pub ncx: Option<FileRef>,
    /// 目录根文档的引用
    #[serde(default)]
    pub toc: Option<FileRef>,
    /// OPF包描述文件自身的输出路径
    #[serde(default)]
    pub opf: String,
    /// 书籍级别声明的样式表
    #[serde(default)]
    pub stylesheets: Vec<HeaderAsset>,
    /// 文档头部引入的脚本
    #[serde(default)]
    pub javascript_top: Vec<HeaderAsset>,
    /// 文档尾部引入的脚本
    #[serde(default)]
    pub javascript_bottom: Vec<HeaderAsset>,
}

impl BookMetadata {
    /// 创建只含书名的元数据(其余字段留待配置或校验补全)
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            languages: Vec::new(),
            identifiers: Vec::new(),
            published: Published::default(),
            subjects: Vec::new(),
            description: None,
            creators: Vec::new(),
            contributors: Vec::new(),
            publisher: None,
            rights: None,
            cover: None,
            ncx: None,
            toc: None,
            opf: String::new(),
            stylesheets: Vec::new(),
            javascript_top: Vec::new(),
            javascript_bottom: Vec::new(),
        }
    }

    /// 从YAML元数据文件加载书籍元数据
    ///
    /// # 参数
    /// * `path` - YAML元数据文件路径
    ///
    /// # 返回值
    /// * `Result<BookMetadata, EpubError>` - 加载后的元数据
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| EpubError::ConfigError(format!("无法读取元数据文件: {}", e)))?;

        serde_yml::from_str(&content)
            .map_err(|e| EpubError::ConfigError(format!("元数据文件格式错误: {}", e)))
    }
}
