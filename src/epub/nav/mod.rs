//! 导航文档构建模块
//!
//! 此模块提供EPUB导航结构的构建功能：把用户声明的目录文档
//! 展开为章节树，并渲染EPUB3导航文档与兼容旧阅读器的NCX文档。

pub mod toc_tree;
pub mod render;

// 重新导出公共类型以保持API兼容性
pub use toc_tree::{ChapterNode, TocTree};
pub use render::{render_cover_page, render_nav, render_ncx};
