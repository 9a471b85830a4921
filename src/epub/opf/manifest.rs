//! 清单模块
//!
//! 提供EPUB包中文件清单的构建功能：按包内路径去重的条目登记、
//! 书籍级头部资源的登记，以及对资源目录的确定性扫描。

use crate::epub::error::Result;
use crate::epub::opf::metadata::BookMetadata;
use crate::epub::paths;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// XHTML内容文档的媒体类型
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
/// NCX导航文档的媒体类型
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";
/// 样式表的媒体类型
pub const CSS_MEDIA_TYPE: &str = "text/css";
/// 脚本的媒体类型
pub const JS_MEDIA_TYPE: &str = "application/javascript";

/// 资源扫描认可的文件扩展名
const ASSET_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "css", "js", "ttf", "otf"];

/// 扩展名到媒体类型的映射表
///
/// ttf/otf是手工指定的：标准映射对这两种字体扩展名不可靠。
static MEDIA_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
        ("webp", "image/webp"),
        ("css", CSS_MEDIA_TYPE),
        ("js", JS_MEDIA_TYPE),
        ("ttf", "application/vnd.ms-opentype"),
        ("otf", "application/vnd.ms-opentype"),
        ("html", XHTML_MEDIA_TYPE),
        ("xhtml", XHTML_MEDIA_TYPE),
        ("ncx", NCX_MEDIA_TYPE),
    ])
});

/// 根据文件扩展名推断媒体类型
pub fn media_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    MEDIA_TYPES
        .get(extension.as_str())
        .copied()
        .unwrap_or("application/octet-stream")
}

/// 清单项信息
#[derive(Debug, Clone)]
pub struct ManifestItem {
    /// 项目ID，在清单内唯一
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: None,
        }
    }

    /// 创建带属性的清单项
    pub fn with_properties(
        id: String,
        href: String,
        media_type: String,
        properties: String,
    ) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: Some(properties),
        }
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        if let Some(properties) = &self.properties {
            properties.split_whitespace().any(|p| p == property)
        } else {
            false
        }
    }

    /// 检查是否为导航文档
    pub fn is_nav(&self) -> bool {
        self.has_property("nav")
    }

    /// 检查是否为封面图片
    pub fn is_cover_image(&self) -> bool {
        self.has_property("cover-image")
    }
}

/// 书籍包的文件清单
///
/// 保持插入顺序；同一包内路径只登记一次，先写入的条目优先。
#[derive(Debug, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    hrefs: HashSet<String>,
}

impl Manifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            hrefs: HashSet::new(),
        }
    }

    /// 登记一个清单项
    ///
    /// 同一包内路径的第二次登记是无操作，不是错误——
    /// 显式配置的资源因此优先于后续目录扫描发现的同名文件。
    ///
    /// # 返回值
    /// * `bool` - 条目是否被实际插入
    pub fn add(&mut self, item: ManifestItem) -> bool {
        if self.hrefs.contains(&item.href) {
            return false;
        }
        self.hrefs.insert(item.href.clone());
        self.items.push(item);
        true
    }

    /// 按插入顺序返回所有清单项
    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    /// 检查指定路径是否已登记
    pub fn contains_href(&self, href: &str) -> bool {
        self.hrefs.contains(href)
    }

    /// 清单项数量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 清单是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 登记书籍级别声明的样式表与脚本
    ///
    /// 路径改写以OPF文件自身的位置为基准，而不是某个具体文档；
    /// 指向外部的声明原样保留。这一步必须在资源扫描之前执行，
    /// 后续扫描到的同名文件才能被去重抑制。
    pub fn add_header_assets(&mut self, metadata: &BookMetadata) -> Result<()> {
        for entry in &metadata.stylesheets {
            let href = paths::rewrite_reference(&entry.href, &metadata.opf, true)?;
            self.add(ManifestItem::new(
                entry.id.clone(),
                href,
                CSS_MEDIA_TYPE.to_string(),
            ));
        }

        for entry in metadata
            .javascript_top
            .iter()
            .chain(metadata.javascript_bottom.iter())
        {
            let href = paths::rewrite_reference(&entry.href, &metadata.opf, true)?;
            self.add(ManifestItem::new(
                entry.id.clone(),
                href,
                JS_MEDIA_TYPE.to_string(),
            ));
        }

        Ok(())
    }

    /// 扫描资源根目录，登记未被显式配置的资源文件
    ///
    /// 按声明顺序处理各个根目录，目录内条目按名称排序后递归下降，
    /// 保证合成的`asset{N}`标识符在多次运行之间可复现。
    ///
    /// # 参数
    /// * `roots` - 资源根目录列表
    /// * `opf_path` - OPF文件的包内路径，用于路径改写
    ///
    /// # 返回值
    /// * `Result<usize, EpubError>` - 新登记的条目数量
    pub fn scan_assets<P: AsRef<Path>>(&mut self, roots: &[P], opf_path: &str) -> Result<usize> {
        let mut asset_num = 0;

        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                continue;
            }

            let mut files = Vec::new();
            collect_asset_files(root, root, &mut files)?;

            for relative in files {
                let href = paths::rewrite_reference(&relative, opf_path, false)?;
                if self.contains_href(&href) {
                    continue;
                }
                let media_type = media_type_for(&relative).to_string();
                self.add(ManifestItem::new(
                    format!("asset{}", asset_num),
                    href,
                    media_type,
                ));
                asset_num += 1;
            }
        }

        Ok(asset_num)
    }
}

/// 递归收集目录下的资源文件，路径相对于扫描根目录
fn collect_asset_files(dir: &Path, base: &Path, out: &mut Vec<String>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_asset_files(&path, base, out)?;
        } else if has_asset_extension(&path) {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }

    Ok(())
}

/// 检查文件扩展名是否在资源扫描的认可列表中
fn has_asset_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for("images/logo.png"), "image/png");
        assert_eq!(media_type_for("style.css"), "text/css");
        assert_eq!(media_type_for("cover.JPG"), "image/jpeg");
        // 字体扩展名使用手工指定的映射
        assert_eq!(media_type_for("fonts/serif.ttf"), "application/vnd.ms-opentype");
        assert_eq!(media_type_for("fonts/serif.otf"), "application/vnd.ms-opentype");
        assert_eq!(media_type_for("unknown.bin"), "application/octet-stream");
    }

    #[test]
    fn test_manifest_add_dedup() {
        let mut manifest = Manifest::new();

        let inserted = manifest.add(ManifestItem::new(
            "style".to_string(),
            "css/style.css".to_string(),
            CSS_MEDIA_TYPE.to_string(),
        ));
        assert!(inserted);

        // 同一路径的第二次登记是无操作
        let inserted = manifest.add(ManifestItem::new(
            "asset0".to_string(),
            "css/style.css".to_string(),
            CSS_MEDIA_TYPE.to_string(),
        ));
        assert!(!inserted);

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.items()[0].id, "style");
    }

    #[test]
    fn test_manifest_item_properties() {
        let item = ManifestItem::with_properties(
            "toc".to_string(),
            "toc.html".to_string(),
            XHTML_MEDIA_TYPE.to_string(),
            "nav".to_string(),
        );
        assert!(item.is_nav());
        assert!(!item.is_cover_image());
    }

    #[test]
    fn test_scan_assets_discovers_and_numbers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        File::create(dir.path().join("images/logo.png"))
            .unwrap()
            .write_all(b"png")
            .unwrap();
        File::create(dir.path().join("style.css"))
            .unwrap()
            .write_all(b"css")
            .unwrap();
        // 认可列表之外的文件被忽略
        File::create(dir.path().join("notes.txt"))
            .unwrap()
            .write_all(b"txt")
            .unwrap();

        let mut manifest = Manifest::new();
        let added = manifest.scan_assets(&[dir.path()], "book.opf").unwrap();

        assert_eq!(added, 2);
        // 目录条目按名称排序: images/ 在 style.css 之前
        assert_eq!(manifest.items()[0].id, "asset0");
        assert_eq!(manifest.items()[0].href, "images/logo.png");
        assert_eq!(manifest.items()[0].media_type, "image/png");
        assert_eq!(manifest.items()[1].id, "asset1");
        assert_eq!(manifest.items()[1].href, "style.css");
    }

    #[test]
    fn test_scan_assets_respects_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("style.css"))
            .unwrap()
            .write_all(b"css")
            .unwrap();
        File::create(dir.path().join("logo.png"))
            .unwrap()
            .write_all(b"png")
            .unwrap();

        let mut manifest = Manifest::new();
        // 头部样式表先登记，扫描不得重复添加
        manifest.add(ManifestItem::new(
            "style".to_string(),
            "style.css".to_string(),
            CSS_MEDIA_TYPE.to_string(),
        ));

        let added = manifest.scan_assets(&[dir.path()], "book.opf").unwrap();
        assert_eq!(added, 1);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.items()[1].id, "asset0");
        assert_eq!(manifest.items()[1].href, "logo.png");
    }

    #[test]
    fn test_add_header_assets() {
        use crate::epub::opf::metadata::{BookMetadata, HeaderAsset};

        let mut metadata = BookMetadata::new("书");
        metadata.opf = "book.opf".to_string();
        metadata.stylesheets = vec![HeaderAsset {
            id: "style".to_string(),
            href: "/css/style.css".to_string(),
        }];
        metadata.javascript_top = vec![HeaderAsset {
            id: "script".to_string(),
            href: "http://example.com/analytics.js".to_string(),
        }];

        let mut manifest = Manifest::new();
        manifest.add_header_assets(&metadata).unwrap();

        assert_eq!(manifest.len(), 2);
        // OPF位于根目录，绝对引用改写为当前目录相对路径
        assert_eq!(manifest.items()[0].href, "css/style.css");
        assert_eq!(manifest.items()[0].media_type, "text/css");
        // 外部引用原样保留
        assert_eq!(manifest.items()[1].href, "http://example.com/analytics.js");
    }
}
