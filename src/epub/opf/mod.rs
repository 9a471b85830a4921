//! OPF（Open Packaging Format）包构建模块
//!
//! 此模块提供EPUB包描述文件的构建功能，包括书籍元数据的加载与校验、
//! 文件清单与阅读顺序的累积，以及OPF文档的渲染。

pub mod metadata;
pub mod validate;
pub mod manifest;
pub mod spine;
pub mod package;

// 重新导出公共类型以保持API兼容性
pub use metadata::{
    BookMetadata,
    Cover,
    CoverPage,
    FileRef,
    HeaderAsset,
    Identifier,
    Published,
};
pub use manifest::{media_type_for, Manifest, ManifestItem};
pub use spine::{Spine, SpineItem};
pub use package::render_package;
pub use validate::{validate, w3c_date_format};
