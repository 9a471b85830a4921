//! 构建流程模块
//!
//! 把各个组件按固定顺序串成单一的构建管线：
//! 配置校验 → 输出布局脚手架 → 封面 → 目录遍历 → 资源登记 →
//! OPF渲染 → 归档打包。后面的步骤消费前面步骤产出的完整
//! 清单与脊柱，因此顺序严格，遇到第一个错误立即中止。
//!
//! 清单与脊柱状态集中放在[`BuildContext`]中，随管线显式传递，
//! 不存在任何全局可变状态。

use crate::epub::bundle;
use crate::epub::container::Container;
use crate::epub::error::{EpubError, Result};
use crate::epub::index::DocumentIndex;
use crate::epub::nav::render;
use crate::epub::nav::toc_tree::TocTree;
use crate::epub::opf::manifest::Manifest;
use crate::epub::opf::metadata::BookMetadata;
use crate::epub::opf::package;
use crate::epub::opf::spine::Spine;
use crate::epub::opf::validate;
use std::fs;
use std::path::{Path, PathBuf};

/// EPUB的mimetype文件内容，不带任何尾随字符
pub const MIMETYPE: &str = "application/epub+zip";

/// 一次构建的全部累积状态
///
/// 元数据在校验阶段被就地补全；清单与脊柱由目录遍历和
/// 资源登记阶段填充；目录树在遍历后保留下来供导航渲染使用。
#[derive(Debug)]
pub struct BuildContext {
    /// 校验后的书籍元数据
    pub metadata: BookMetadata,
    /// 书籍清单
    pub manifest: Manifest,
    /// 书籍脊柱
    pub spine: Spine,
    /// 展开并最终化后的目录树
    pub toc: Option<TocTree>,
    /// 追加到目录文档的导航标记
    pub nav_markup: Option<String>,
}

impl BuildContext {
    /// 以给定元数据创建空的构建上下文
    pub fn new(metadata: BookMetadata) -> Self {
        Self {
            metadata,
            manifest: Manifest::new(),
            spine: Spine::new(),
            toc: None,
            nav_markup: None,
        }
    }
}

/// EPUB构建器
///
/// 持有输出布局目录与资源扫描根目录，驱动完整的构建管线。
pub struct EpubBuilder {
    layout_root: PathBuf,
    asset_roots: Vec<PathBuf>,
}

impl EpubBuilder {
    /// 创建构建器
    ///
    /// # 参数
    /// * `layout_root` - 输出布局目录，宿主渲染器已把文档与资源写入其中
    pub fn new<P: AsRef<Path>>(layout_root: P) -> Self {
        Self {
            layout_root: layout_root.as_ref().to_path_buf(),
            asset_roots: Vec::new(),
        }
    }

    /// 指定额外的资源扫描根目录
    ///
    /// 不指定时默认扫描输出布局目录本身。
    pub fn with_asset_roots<P: AsRef<Path>>(mut self, roots: &[P]) -> Self {
        self.asset_roots = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
        self
    }

    /// 执行完整的构建管线
    ///
    /// # 参数
    /// * `metadata` - 书籍元数据，校验阶段会就地补全
    /// * `index` - 文档索引；导航标记会追加到目录文档的记录中
    /// * `destination` - EPUB归档的写入路径
    ///
    /// # 返回值
    /// * `Result<BuildContext, EpubError>` - 构建完成后的上下文
    pub fn build(
        &self,
        metadata: BookMetadata,
        index: &mut dyn DocumentIndex,
        destination: &Path,
    ) -> Result<BuildContext> {
        let mut context = BuildContext::new(metadata);

        validate::validate(&mut context.metadata)?;

        self.make_meta_inf()?;
        self.make_mimetype_file()?;
        self.make_container_xml(&context)?;
        self.make_cover_files(&context)?;
        self.scan_toc(&mut context, index)?;
        self.register_assets(&mut context)?;
        self.make_opf(&context)?;

        bundle::bundle(
            &self.layout_root,
            &context.manifest,
            &context.metadata.opf,
            destination,
        )?;

        Ok(context)
    }

    /// 创建META-INF控制目录
    fn make_meta_inf(&self) -> Result<()> {
        fs::create_dir_all(self.layout_root.join("META-INF"))?;
        Ok(())
    }

    /// 写出mimetype文件，内容精确且不带尾随换行
    fn make_mimetype_file(&self) -> Result<()> {
        fs::write(self.layout_root.join("mimetype"), MIMETYPE)?;
        Ok(())
    }

    /// 渲染并写出META-INF/container.xml
    fn make_container_xml(&self, context: &BuildContext) -> Result<()> {
        let container = Container::for_package(&context.metadata.opf);
        let xml = container.to_xml()?;
        fs::write(self.layout_root.join("META-INF/container.xml"), xml)?;
        Ok(())
    }

    /// 生成内联封面页(若配置要求)
    fn make_cover_files(&self, context: &BuildContext) -> Result<()> {
        let Some(cover) = &context.metadata.cover else {
            return Ok(());
        };
        let Some(page) = &cover.write_html else {
            return Ok(());
        };

        let html = render::render_cover_page(cover)?;
        self.write_layout_file(&page.href, html.as_bytes())
    }

    /// 展开目录树，登记导航条目，渲染导航文档
    ///
    /// nav标记追加到目录文档在索引中的记录里，由宿主渲染器
    /// 嵌入最终页面；NCX文档(若配置)直接写入输出布局。
    fn scan_toc(&self, context: &mut BuildContext, index: &mut dyn DocumentIndex) -> Result<()> {
        let toc_href = context
            .metadata
            .toc
            .as_ref()
            .map(|toc| toc.href.clone())
            .ok_or_else(|| EpubError::ConfigError("未配置目录文档".to_string()))?;

        let mut tree = TocTree::build(&toc_href, &*index)?;
        tree.register(&context.metadata, &mut context.manifest, &mut context.spine)?;

        let nav_markup = render::render_nav(&tree)?;
        index.append_text(&toc_href, &nav_markup);

        if let Some(ncx) = &context.metadata.ncx {
            let ncx_xml = render::render_ncx(&context.metadata, &tree)?;
            self.write_layout_file(&ncx.href, ncx_xml.as_bytes())?;
        }

        context.nav_markup = Some(nav_markup);
        context.toc = Some(tree);
        Ok(())
    }

    /// 登记头部资源并扫描资源目录
    fn register_assets(&self, context: &mut BuildContext) -> Result<()> {
        context.manifest.add_header_assets(&context.metadata)?;

        if self.asset_roots.is_empty() {
            context
                .manifest
                .scan_assets(&[&self.layout_root], &context.metadata.opf)?;
        } else {
            context
                .manifest
                .scan_assets(&self.asset_roots, &context.metadata.opf)?;
        }
        Ok(())
    }

    /// 渲染并写出OPF包描述文件
    fn make_opf(&self, context: &BuildContext) -> Result<()> {
        let opf = package::render_package(&context.metadata, &context.manifest, &context.spine)?;
        self.write_layout_file(&context.metadata.opf, opf.as_bytes())
    }

    /// 向输出布局写一个文件，按需创建父目录
    fn write_layout_file(&self, relative: &str, content: &[u8]) -> Result<()> {
        let path = self.layout_root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::index::{DocumentRecord, MemoryIndex};
    use crate::epub::opf::metadata::{FileRef, HeaderAsset};
    use std::fs::File;
    use std::io::Read;
    use zip::ZipArchive;

    fn record(id: &str, title: &str, sections: Option<Vec<&str>>) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: None,
            sections: sections.map(|s| s.iter().map(|r| r.to_string()).collect()),
            toc_type: Some("toc".to_string()),
            toc_start: None,
            text: String::new(),
        }
    }

    fn sample_index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.insert("toc.html", record("toc", "目录", Some(vec!["ch1.html", "ch2.html"])));
        index.insert("ch1.html", record("ch1", "第一章", Some(vec!["ch1/s1.html"])));
        index.insert("ch1/s1.html", record("s1", "第一节", None));
        index.insert("ch2.html", record("ch2", "第二章", None));
        index
    }

    fn sample_metadata() -> BookMetadata {
        let mut metadata = BookMetadata::new("测试书籍");
        metadata.languages = vec!["zh".to_string()];
        metadata.opf = "book.opf".to_string();
        metadata.toc = Some(FileRef {
            id: "toc".to_string(),
            href: "toc.html".to_string(),
        });
        metadata.ncx = Some(FileRef {
            id: "ncx".to_string(),
            href: "toc.ncx".to_string(),
        });
        metadata.stylesheets = vec![HeaderAsset {
            id: "style".to_string(),
            href: "/css/style.css".to_string(),
        }];
        metadata
    }

    fn write_rendered_documents(root: &Path) {
        for (path, content) in [
            ("toc.html", "<html><body>目录</body></html>"),
            ("ch1.html", "<html><body>第一章</body></html>"),
            ("ch1/s1.html", "<html><body>第一节</body></html>"),
            ("ch2.html", "<html><body>第二章</body></html>"),
            ("css/style.css", "body {}"),
        ] {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn test_build_produces_readable_epub() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("out");
        fs::create_dir_all(&layout).unwrap();
        write_rendered_documents(&layout);

        let mut index = sample_index();
        let destination = dir.path().join("book.epub");
        let builder = EpubBuilder::new(&layout);
        let context = builder
            .build(sample_metadata(), &mut index, &destination)
            .unwrap();

        // 脊柱: 导航文档在前，章节按先序
        let idrefs: Vec<&str> = context
            .spine
            .items()
            .iter()
            .map(|i| i.idref.as_str())
            .collect();
        assert_eq!(idrefs, vec!["toc", "ch1", "s1", "ch2"]);

        // 头部样式表优先登记，扫描不产生重复条目
        let css_entries = context
            .manifest
            .items()
            .iter()
            .filter(|i| i.href == "css/style.css")
            .count();
        assert_eq!(css_entries, 1);
        assert_eq!(
            context
                .manifest
                .items()
                .iter()
                .find(|i| i.href == "css/style.css")
                .unwrap()
                .id,
            "style"
        );

        // 归档结构: mimetype是第一个条目且不压缩
        let mut archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, MIMETYPE);
    }

    #[test]
    fn test_build_appends_nav_to_toc_document() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("out");
        fs::create_dir_all(&layout).unwrap();
        write_rendered_documents(&layout);

        let mut index = sample_index();
        let destination = dir.path().join("book.epub");
        let context = EpubBuilder::new(&layout)
            .build(sample_metadata(), &mut index, &destination)
            .unwrap();

        let toc_record = index.lookup("toc.html").unwrap();
        assert!(toc_record.text.contains("<nav"));
        assert!(toc_record.text.contains("第一章"));
        assert_eq!(context.nav_markup.as_deref(), Some(toc_record.text.as_str()));

        // NCX写入输出布局并登记在清单中
        assert!(layout.join("toc.ncx").exists());
        assert!(context.manifest.contains_href("toc.ncx"));
    }

    #[test]
    fn test_build_validation_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("out");
        fs::create_dir_all(&layout).unwrap();

        let mut metadata = sample_metadata();
        metadata.opf = String::new();

        let mut index = sample_index();
        let destination = dir.path().join("book.epub");
        let result = EpubBuilder::new(&layout).build(metadata, &mut index, &destination);

        assert!(matches!(result, Err(EpubError::ConfigError(_))));
        // 校验失败在任何输出写出之前中止
        assert!(!layout.join("mimetype").exists());
        assert!(!destination.exists());
    }

    #[test]
    fn test_build_missing_chapter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("out");
        fs::create_dir_all(&layout).unwrap();
        write_rendered_documents(&layout);

        let mut index = sample_index();
        index.insert(
            "toc.html",
            record("toc", "目录", Some(vec!["ch1.html", "ghost.html"])),
        );

        let destination = dir.path().join("book.epub");
        let result = EpubBuilder::new(&layout).build(sample_metadata(), &mut index, &destination);
        assert!(matches!(result, Err(EpubError::UnresolvedReference(_))));
        assert!(!destination.exists());
    }
}
