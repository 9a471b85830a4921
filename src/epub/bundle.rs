//! 打包模块
//!
//! 把输出布局目录序列化为最终的EPUB归档。
//! 本模块独自负责格式的结构性约束：归档的第一个条目必须是
//! 不压缩存储的mimetype文件，否则阅读器会拒绝整个书籍包，
//! 即使归档本身是合法的zip文件。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::manifest::Manifest;
use crate::epub::paths;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 把输出布局打包为EPUB归档
///
/// 条目顺序固定：`mimetype`(不压缩)、`META-INF/container.xml`、
/// OPF包描述文件，之后按清单插入顺序写入每个清单条目的文件。
/// 条目名等于文件的包内路径(`/`分隔)，内容从输出布局目录读取。
///
/// # 参数
/// * `layout_root` - 输出布局的根目录
/// * `manifest` - 完整的书籍清单
/// * `opf_path` - OPF文件的包内路径
/// * `destination` - 归档文件的写入路径
///
/// # 返回值
/// * `Result<(), EpubError>` - 打包失败时返回`Packaging`错误；
///   已写出的部分目标文件不做清理，但输出流总是被完成或丢弃
pub fn bundle<P: AsRef<Path>, Q: AsRef<Path>>(
    layout_root: P,
    manifest: &Manifest,
    opf_path: &str,
    destination: Q,
) -> Result<()> {
    let root = layout_root.as_ref();
    let destination = destination.as_ref();

    let file = File::create(destination).map_err(|e| {
        EpubError::Packaging(format!("无法创建归档文件{}: {}", destination.display(), e))
    })?;
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // mimetype必须是第一个条目且不压缩
    append_entry(&mut zip, root, "mimetype", stored)?;
    append_entry(&mut zip, root, "META-INF/container.xml", deflated)?;
    append_entry(&mut zip, root, opf_path, deflated)?;

    for item in manifest.items() {
        // 外部引用的资源不在书籍包内，无从归档
        if paths::is_external(&item.href) {
            continue;
        }
        append_entry(&mut zip, root, &item.href, deflated)?;
    }

    zip.finish()
        .map_err(|e| EpubError::Packaging(format!("无法完成归档: {}", e)))?;

    Ok(())
}

/// 从输出布局读取一个文件并追加为归档条目
fn append_entry(
    zip: &mut ZipWriter<File>,
    root: &Path,
    entry_name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let path = root.join(entry_name);
    let content = fs::read(&path)
        .map_err(|e| EpubError::Packaging(format!("无法读取{}: {}", path.display(), e)))?;

    zip.start_file(entry_name, options)
        .map_err(|e| EpubError::Packaging(format!("无法写入条目{}: {}", entry_name, e)))?;
    zip.write_all(&content)
        .map_err(|e| EpubError::Packaging(format!("无法写入条目{}: {}", entry_name, e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::opf::manifest::{ManifestItem, CSS_MEDIA_TYPE, XHTML_MEDIA_TYPE};
    use std::io::Read;
    use zip::ZipArchive;

    fn write_layout_file(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn sample_layout(root: &Path) -> Manifest {
        write_layout_file(root, "mimetype", b"application/epub+zip");
        write_layout_file(root, "META-INF/container.xml", b"<container/>");
        write_layout_file(root, "book.opf", b"<package/>");
        write_layout_file(root, "toc.html", b"<nav/>");
        write_layout_file(root, "css/style.css", b"body {}");

        let mut manifest = Manifest::new();
        manifest.add(ManifestItem::new(
            "toc".to_string(),
            "toc.html".to_string(),
            XHTML_MEDIA_TYPE.to_string(),
        ));
        manifest.add(ManifestItem::new(
            "style".to_string(),
            "css/style.css".to_string(),
            CSS_MEDIA_TYPE.to_string(),
        ));
        manifest
    }

    #[test]
    fn test_bundle_mimetype_first_and_stored() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = sample_layout(dir.path());
        let destination = dir.path().join("book.epub");

        bundle(dir.path(), &manifest, "book.opf", &destination).unwrap();

        let mut archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);

        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "application/epub+zip");
    }

    #[test]
    fn test_bundle_entry_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = sample_layout(dir.path());
        let destination = dir.path().join("book.epub");

        bundle(dir.path(), &manifest, "book.opf", &destination).unwrap();

        let mut archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "mimetype",
                "META-INF/container.xml",
                "book.opf",
                "toc.html",
                "css/style.css"
            ]
        );
    }

    #[test]
    fn test_bundle_skips_external_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = sample_layout(dir.path());
        manifest.add(ManifestItem::new(
            "remote".to_string(),
            "http://example.com/analytics.js".to_string(),
            "application/javascript".to_string(),
        ));
        let destination = dir.path().join("book.epub");

        bundle(dir.path(), &manifest, "book.opf", &destination).unwrap();

        let archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.len(), 5);
    }

    #[test]
    fn test_bundle_missing_file_is_packaging_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = sample_layout(dir.path());
        manifest.add(ManifestItem::new(
            "ghost".to_string(),
            "missing.html".to_string(),
            XHTML_MEDIA_TYPE.to_string(),
        ));
        let destination = dir.path().join("book.epub");

        let result = bundle(dir.path(), &manifest, "book.opf", &destination);
        assert!(matches!(result, Err(EpubError::Packaging(_))));
    }
}
