//! OPF包描述文件渲染模块
//!
//! 把书籍元数据、清单与脊柱渲染为OPF包描述文档。
//! 渲染是纯函数，不访问文件系统；写盘由构建流程负责。

use crate::epub::error::Result;
use crate::epub::opf::manifest::Manifest;
use crate::epub::opf::metadata::BookMetadata;
use crate::epub::opf::spine::Spine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

/// 唯一标识符元素的固定ID，package元素通过它引用唯一标识符
const UNIQUE_IDENTIFIER_ID: &str = "pub-id";

/// 渲染OPF包描述文档
///
/// # 参数
/// * `metadata` - 校验后的书籍元数据(恰好一个唯一标识符)
/// * `manifest` - 完整的书籍清单
/// * `spine` - 完整的书籍脊柱
///
/// # 返回值
/// * `Result<String, EpubError>` - OPF文档的XML文本
pub fn render_package(
    metadata: &BookMetadata,
    manifest: &Manifest,
    spine: &Spine,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut package = BytesStart::new("package");
    package.push_attribute(("xmlns", "http://www.idpf.org/2007/opf"));
    package.push_attribute(("version", "3.0"));
    package.push_attribute(("unique-identifier", UNIQUE_IDENTIFIER_ID));
    writer.write_event(Event::Start(package))?;

    write_metadata(&mut writer, metadata)?;
    write_manifest(&mut writer, manifest)?;
    write_spine(&mut writer, metadata, spine)?;

    writer.write_event(Event::End(BytesEnd::new("package")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// 写metadata元素
fn write_metadata(writer: &mut Writer<Vec<u8>>, metadata: &BookMetadata) -> Result<()> {
    let mut elem = BytesStart::new("metadata");
    elem.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    writer.write_event(Event::Start(elem))?;

    for identifier in &metadata.identifiers {
        let mut id_elem = BytesStart::new("dc:identifier");
        if identifier.unique {
            id_elem.push_attribute(("id", UNIQUE_IDENTIFIER_ID));
        }
        writer.write_event(Event::Start(id_elem))?;
        writer.write_event(Event::Text(BytesText::new(&identifier.value)))?;
        writer.write_event(Event::End(BytesEnd::new("dc:identifier")))?;
    }

    write_text_element(writer, "dc:title", &metadata.title)?;

    for language in &metadata.languages {
        write_text_element(writer, "dc:language", language)?;
    }

    if let Some(date) = &metadata.published.date {
        write_text_element(writer, "dc:date", date)?;
    }
    if let Some(modified) = &metadata.published.modified {
        let mut meta = BytesStart::new("meta");
        meta.push_attribute(("property", "dcterms:modified"));
        writer.write_event(Event::Start(meta))?;
        writer.write_event(Event::Text(BytesText::new(modified)))?;
        writer.write_event(Event::End(BytesEnd::new("meta")))?;
    }

    for subject in &metadata.subjects {
        write_text_element(writer, "dc:subject", subject)?;
    }
    if let Some(description) = &metadata.description {
        write_text_element(writer, "dc:description", description)?;
    }
    for creator in &metadata.creators {
        write_text_element(writer, "dc:creator", creator)?;
    }
    for contributor in &metadata.contributors {
        write_text_element(writer, "dc:contributor", contributor)?;
    }
    if let Some(publisher) = &metadata.publisher {
        write_text_element(writer, "dc:publisher", publisher)?;
    }
    if let Some(rights) = &metadata.rights {
        write_text_element(writer, "dc:rights", rights)?;
    }

    // 旧阅读器通过name=cover的meta找封面图片
    if let Some(cover) = &metadata.cover {
        let mut meta = BytesStart::new("meta");
        meta.push_attribute(("name", "cover"));
        meta.push_attribute(("content", cover.id_image.as_str()));
        writer.write_event(Event::Empty(meta))?;
    }

    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}

/// 写manifest元素，条目顺序与清单插入顺序一致
fn write_manifest(writer: &mut Writer<Vec<u8>>, manifest: &Manifest) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("manifest")))?;

    for item in manifest.items() {
        let mut elem = BytesStart::new("item");
        elem.push_attribute(("id", item.id.as_str()));
        elem.push_attribute(("href", item.href.as_str()));
        elem.push_attribute(("media-type", item.media_type.as_str()));
        if let Some(properties) = &item.properties {
            elem.push_attribute(("properties", properties.as_str()));
        }
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new("manifest")))?;
    Ok(())
}

/// 写spine元素，itemref顺序与脊柱插入顺序一致
fn write_spine(
    writer: &mut Writer<Vec<u8>>,
    metadata: &BookMetadata,
    spine: &Spine,
) -> Result<()> {
    let mut elem = BytesStart::new("spine");
    if let Some(ncx) = &metadata.ncx {
        elem.push_attribute(("toc", ncx.id.as_str()));
    }
    writer.write_event(Event::Start(elem))?;

    for item in spine.items() {
        let mut itemref = BytesStart::new("itemref");
        itemref.push_attribute(("idref", item.idref.as_str()));
        if !item.is_linear() {
            itemref.push_attribute(("linear", "no"));
        }
        writer.write_event(Event::Empty(itemref))?;
    }

    writer.write_event(Event::End(BytesEnd::new("spine")))?;
    Ok(())
}

/// 写一个纯文本内容的元素
fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
