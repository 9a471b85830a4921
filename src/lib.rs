pub mod epub;

// === 核心API重新导出 ===

/// EPUB构建器（主要接口）
pub use epub::{BuildContext, EpubBuilder};

/// 错误处理
pub use epub::{EpubError, Result};

// === 数据结构 ===

/// 书籍元数据
pub use epub::{BookMetadata, Cover, CoverPage, FileRef, HeaderAsset, Identifier, Published};

/// 文档索引协作接口
pub use epub::{DocumentIndex, DocumentRecord, MemoryIndex};

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

/// 清单与脊柱组件
pub use epub::{Manifest, ManifestItem, Spine, SpineItem};

/// 目录树组件
pub use epub::{ChapterNode, TocTree};

// === 库信息 ===

/// Bindery库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bindery库的描述
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
