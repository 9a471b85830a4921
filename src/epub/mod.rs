pub mod error;
pub mod paths;
pub mod container;
pub mod index;
pub mod opf;
pub mod nav;
pub mod bundle;
pub mod builder;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出构建管线
pub use builder::{BuildContext, EpubBuilder, MIMETYPE};

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出文档索引协作接口
pub use index::{DocumentIndex, DocumentRecord, MemoryIndex};

// 重新导出OPF相关
pub use opf::{
    BookMetadata,
    Cover,
    CoverPage,
    FileRef,
    HeaderAsset,
    Identifier,
    Manifest,
    ManifestItem,
    Published,
    Spine,
    SpineItem,
};

// 重新导出导航相关
pub use nav::{ChapterNode, TocTree};
