//! 目录树（Table of Contents Tree）模块
//!
//! 把用户在目录文档中声明的章节列表展开为章节树，
//! 并在最终化阶段按先序遍历生成清单条目与脊柱顺序。

use crate::epub::error::{EpubError, Result};
use crate::epub::index::DocumentIndex;
use crate::epub::opf::manifest::{Manifest, ManifestItem, NCX_MEDIA_TYPE, XHTML_MEDIA_TYPE};
use crate::epub::opf::metadata::BookMetadata;
use crate::epub::opf::spine::{Spine, SpineItem};
use crate::epub::paths;

/// 章节树节点
///
/// 树形结构来自文档front matter的声明，自顶向下构建，
/// 不含回边，因此不可能成环。
#[derive(Debug, Clone)]
pub struct ChapterNode {
    /// 章节标识符(来自文档声明)
    pub id: String,
    /// 章节标题
    pub title: String,
    /// 章节文档的包内路径
    pub href: String,
    /// 媒体类型，章节总是XHTML文档
    pub media_type: String,
    /// 子章节列表(按声明顺序)
    pub children: Vec<ChapterNode>,
    /// 阅读顺序序号，最终化阶段赋值(1起始)
    pub reading_order: u32,
}

impl ChapterNode {
    /// 获取以该节点为根的子树最大深度(根为1)
    pub fn max_depth(&self) -> u32 {
        1 + self
            .children
            .iter()
            .map(ChapterNode::max_depth)
            .max()
            .unwrap_or(0)
    }

    /// 获取节点及其所有子节点的数量
    pub fn total_nodes(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ChapterNode::total_nodes)
            .sum::<usize>()
    }

    /// 按先序把子树展平为节点列表
    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a ChapterNode>) {
        out.push(self);
        for child in &self.children {
            child.flatten_into(out);
        }
    }
}

/// 章节目录树
///
/// 根字段来自目录文档自身的声明，`chapters`是展开后的章节树。
#[derive(Debug, Clone)]
pub struct TocTree {
    /// 目录文档声明的标识符
    pub id: String,
    /// 目录文档标题
    pub title: String,
    /// 目录文档副标题
    pub subtitle: Option<String>,
    /// 目录文档的包内路径
    pub href: String,
    /// 目录类型声明(如"toc")
    pub toc_type: Option<String>,
    /// 是否为阅读起点
    pub toc_start: Option<bool>,
    /// 展开后的章节树(按声明顺序)
    pub chapters: Vec<ChapterNode>,
}

impl TocTree {
    /// 由目录文档展开章节树
    ///
    /// 对目录文档声明的每个章节引用：以目录文档所在目录为基准
    /// 解析出完整包内路径，在文档索引中查找，再以该章节自身的
    /// 路径为新基准递归展开其声明的子章节。树的嵌套只取决于
    /// 声明结构，与实际目录布局无关。
    ///
    /// # 参数
    /// * `toc_href` - 目录文档的包内路径
    /// * `index` - 文档索引
    ///
    /// # 返回值
    /// * `Result<TocTree, EpubError>` - 展开后的目录树
    pub fn build(toc_href: &str, index: &dyn DocumentIndex) -> Result<TocTree> {
        let toc_entry = index
            .lookup(toc_href)
            .ok_or_else(|| EpubError::MissingTocEntry(toc_href.to_string()))?;

        let declared = toc_entry
            .sections
            .as_ref()
            .filter(|sections| !sections.is_empty())
            .ok_or_else(|| EpubError::NoChaptersDeclared(toc_href.to_string()))?;

        let chapters = build_chapter_list(declared, toc_href, index)?;

        Ok(TocTree {
            id: toc_entry.id.clone(),
            title: toc_entry.title.clone(),
            subtitle: toc_entry.subtitle.clone(),
            href: toc_href.to_string(),
            toc_type: toc_entry.toc_type.clone(),
            toc_start: toc_entry.toc_start,
            chapters,
        })
    }

    /// 登记导航相关条目并最终化章节树
    ///
    /// 登记顺序决定脊柱顺序：先是封面页(若配置了内联封面页生成)，
    /// 然后是目录导航文档本身，之后NCX文档(只进清单，不进脊柱)，
    /// 最后对章节树做先序遍历，为每个节点赋1起始的阅读顺序序号，
    /// 并按同一顺序追加清单条目与线性脊柱项。
    ///
    /// # 参数
    /// * `metadata` - 校验后的书籍元数据
    /// * `manifest` - 书籍清单
    /// * `spine` - 书籍脊柱
    pub fn register(
        &mut self,
        metadata: &BookMetadata,
        manifest: &mut Manifest,
        spine: &mut Spine,
    ) -> Result<()> {
        if let Some(cover) = &metadata.cover {
            let image_href = paths::rewrite_reference(&cover.src, &metadata.opf, false)?;
            manifest.add(ManifestItem::with_properties(
                cover.id_image.clone(),
                image_href,
                cover.media_type.clone(),
                "cover-image".to_string(),
            ));

            if let Some(page) = &cover.write_html {
                let href = paths::rewrite_reference(&page.href, &metadata.opf, false)?;
                manifest.add(ManifestItem::new(
                    page.id.clone(),
                    href,
                    XHTML_MEDIA_TYPE.to_string(),
                ));
                spine.push(SpineItem::new(page.id.clone()));
            }
        }

        let nav_href = paths::rewrite_reference(&self.href, &metadata.opf, false)?;
        manifest.add(ManifestItem::with_properties(
            self.id.clone(),
            nav_href,
            XHTML_MEDIA_TYPE.to_string(),
            "nav".to_string(),
        ));
        spine.push(SpineItem::new(self.id.clone()));

        if let Some(ncx) = &metadata.ncx {
            let href = paths::rewrite_reference(&ncx.href, &metadata.opf, false)?;
            manifest.add(ManifestItem::new(
                ncx.id.clone(),
                href,
                NCX_MEDIA_TYPE.to_string(),
            ));
        }

        for chapter in &mut self.chapters {
            finalize_chapter(chapter, &metadata.opf, manifest, spine)?;
        }

        Ok(())
    }

    /// 按先序把整棵章节树展平为节点列表
    pub fn flatten(&self) -> Vec<&ChapterNode> {
        let mut out = Vec::new();
        for chapter in &self.chapters {
            chapter.flatten_into(&mut out);
        }
        out
    }

    /// 章节树的最大嵌套深度
    pub fn max_depth(&self) -> u32 {
        self.chapters
            .iter()
            .map(ChapterNode::max_depth)
            .max()
            .unwrap_or(0)
    }
}

/// 按声明顺序展开一层章节引用
fn build_chapter_list(
    references: &[String],
    base_document: &str,
    index: &dyn DocumentIndex,
) -> Result<Vec<ChapterNode>> {
    let mut chapters = Vec::new();

    for reference in references {
        let full_path = paths::resolve_against(reference, base_document)?;
        let entry = index
            .lookup(&full_path)
            .ok_or_else(|| EpubError::UnresolvedReference(reference.clone()))?;

        let children = match &entry.sections {
            // 子章节以本章节自己的路径为解析基准
            Some(sections) => build_chapter_list(sections, &full_path, index)?,
            None => Vec::new(),
        };

        chapters.push(ChapterNode {
            id: entry.id.clone(),
            title: entry.title.clone(),
            href: full_path,
            media_type: XHTML_MEDIA_TYPE.to_string(),
            children,
            reading_order: 0,
        });
    }

    Ok(chapters)
}

/// 先序最终化一个章节节点：赋阅读顺序并追加清单与脊柱条目
fn finalize_chapter(
    chapter: &mut ChapterNode,
    opf_path: &str,
    manifest: &mut Manifest,
    spine: &mut Spine,
) -> Result<()> {
    chapter.reading_order = spine.len() as u32 + 1;

    let href = paths::rewrite_reference(&chapter.href, opf_path, false)?;
    manifest.add(ManifestItem::new(
        chapter.id.clone(),
        href,
        chapter.media_type.clone(),
    ));
    spine.push(SpineItem::new(chapter.id.clone()));

    for child in &mut chapter.children {
        finalize_chapter(child, opf_path, manifest, spine)?;
    }

    Ok(())
}
