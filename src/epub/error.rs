use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub组装过程中的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML生成错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("书籍配置错误: {0}")]
    ConfigError(String),

    #[error("不允许指向外部的引用: {0}")]
    ExternalReference(String),

    #[error("引用无法在文档索引中解析: {0}")]
    UnresolvedReference(String),

    #[error("目录文档不存在: {0}")]
    MissingTocEntry(String),

    #[error("目录文档中没有声明任何章节: {0}")]
    NoChaptersDeclared(String),

    #[error("打包EPUB文件失败: {0}")]
    Packaging(String),
}
