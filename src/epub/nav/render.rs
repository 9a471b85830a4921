//! 导航文档渲染模块
//!
//! 由章节树渲染面向读者的导航文档：EPUB3的nav文档片段、
//! 兼容旧阅读器的NCX文档，以及可选的内联封面页。
//! 所有渲染函数都是纯函数，写盘由调用方负责。

use crate::epub::error::Result;
use crate::epub::nav::toc_tree::{ChapterNode, TocTree};
use crate::epub::opf::metadata::{BookMetadata, Cover};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

/// 渲染EPUB3导航文档的nav片段
///
/// 片段会由宿主渲染器嵌入目录文档的最终页面，
/// 嵌套的`ol`列表与章节树的声明结构一一对应。
///
/// # 参数
/// * `tree` - 展开并最终化后的目录树
///
/// # 返回值
/// * `Result<String, EpubError>` - nav片段的XHTML文本
pub fn render_nav(tree: &TocTree) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut nav = BytesStart::new("nav");
    nav.push_attribute(("xmlns:epub", "http://www.idpf.org/2007/ops"));
    nav.push_attribute(("epub:type", tree.toc_type.as_deref().unwrap_or("toc")));
    nav.push_attribute(("id", tree.id.as_str()));
    writer.write_event(Event::Start(nav))?;

    writer.write_event(Event::Start(BytesStart::new("h1")))?;
    writer.write_event(Event::Text(BytesText::new(&tree.title)))?;
    writer.write_event(Event::End(BytesEnd::new("h1")))?;

    if let Some(subtitle) = &tree.subtitle {
        let mut p = BytesStart::new("p");
        p.push_attribute(("class", "subtitle"));
        writer.write_event(Event::Start(p))?;
        writer.write_event(Event::Text(BytesText::new(subtitle)))?;
        writer.write_event(Event::End(BytesEnd::new("p")))?;
    }

    write_chapter_list(&mut writer, &tree.chapters)?;

    writer.write_event(Event::End(BytesEnd::new("nav")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// 渲染一层章节的有序列表，递归处理子章节
fn write_chapter_list(writer: &mut Writer<Vec<u8>>, chapters: &[ChapterNode]) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("ol")))?;

    for chapter in chapters {
        writer.write_event(Event::Start(BytesStart::new("li")))?;

        let mut anchor = BytesStart::new("a");
        anchor.push_attribute(("href", chapter.href.as_str()));
        writer.write_event(Event::Start(anchor))?;
        writer.write_event(Event::Text(BytesText::new(&chapter.title)))?;
        writer.write_event(Event::End(BytesEnd::new("a")))?;

        if !chapter.children.is_empty() {
            write_chapter_list(writer, &chapter.children)?;
        }

        writer.write_event(Event::End(BytesEnd::new("li")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("ol")))?;
    Ok(())
}

/// 渲染兼容旧阅读器的NCX导航文档
///
/// navMap是章节树的展平列表(不保留嵌套)，playOrder取自
/// 最终化阶段赋予各章节的阅读顺序序号。
///
/// # 参数
/// * `metadata` - 校验后的书籍元数据(取唯一标识符与书名)
/// * `tree` - 展开并最终化后的目录树
pub fn render_ncx(metadata: &BookMetadata, tree: &TocTree) -> Result<String> {
    let uid = metadata
        .identifiers
        .iter()
        .find(|i| i.unique)
        .map(|i| i.value.as_str())
        .unwrap_or("");

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut ncx = BytesStart::new("ncx");
    ncx.push_attribute(("xmlns", "http://www.daisy.org/z3986/2005/ncx/"));
    ncx.push_attribute(("version", "2005-1"));
    writer.write_event(Event::Start(ncx))?;

    writer.write_event(Event::Start(BytesStart::new("head")))?;
    write_head_meta(&mut writer, "dtb:uid", uid)?;
    write_head_meta(&mut writer, "dtb:depth", &tree.max_depth().to_string())?;
    write_head_meta(&mut writer, "dtb:totalPageCount", "0")?;
    write_head_meta(&mut writer, "dtb:maxPageNumber", "0")?;
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("docTitle")))?;
    writer.write_event(Event::Start(BytesStart::new("text")))?;
    writer.write_event(Event::Text(BytesText::new(&metadata.title)))?;
    writer.write_event(Event::End(BytesEnd::new("text")))?;
    writer.write_event(Event::End(BytesEnd::new("docTitle")))?;

    writer.write_event(Event::Start(BytesStart::new("navMap")))?;
    for chapter in tree.flatten() {
        let mut nav_point = BytesStart::new("navPoint");
        let id = format!("navpoint-{}", chapter.reading_order);
        let play_order = chapter.reading_order.to_string();
        nav_point.push_attribute(("id", id.as_str()));
        nav_point.push_attribute(("playOrder", play_order.as_str()));
        writer.write_event(Event::Start(nav_point))?;

        writer.write_event(Event::Start(BytesStart::new("navLabel")))?;
        writer.write_event(Event::Start(BytesStart::new("text")))?;
        writer.write_event(Event::Text(BytesText::new(&chapter.title)))?;
        writer.write_event(Event::End(BytesEnd::new("text")))?;
        writer.write_event(Event::End(BytesEnd::new("navLabel")))?;

        let mut content = BytesStart::new("content");
        content.push_attribute(("src", chapter.href.as_str()));
        writer.write_event(Event::Empty(content))?;

        writer.write_event(Event::End(BytesEnd::new("navPoint")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("navMap")))?;

    writer.write_event(Event::End(BytesEnd::new("ncx")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// 写一个NCX头部的meta元素
fn write_head_meta(writer: &mut Writer<Vec<u8>>, name: &str, content: &str) -> Result<()> {
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("name", name));
    meta.push_attribute(("content", content));
    writer.write_event(Event::Empty(meta))?;
    Ok(())
}

/// 渲染内联的XHTML封面页
///
/// 封面图片引用改写为相对于封面页自身位置的路径。
///
/// # 参数
/// * `cover` - 封面配置，必须带有`write_html`
pub fn render_cover_page(cover: &Cover) -> Result<String> {
    let page_href = cover
        .write_html
        .as_ref()
        .map(|page| page.href.as_str())
        .unwrap_or("cover.html");
    let image_src = crate::epub::paths::rewrite_reference(&cover.src, page_href, false)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut html = BytesStart::new("html");
    html.push_attribute(("xmlns", "http://www.w3.org/1999/xhtml"));
    writer.write_event(Event::Start(html))?;

    writer.write_event(Event::Start(BytesStart::new("head")))?;
    writer.write_event(Event::Start(BytesStart::new("title")))?;
    writer.write_event(Event::Text(BytesText::new("封面")))?;
    writer.write_event(Event::End(BytesEnd::new("title")))?;
    writer.write_event(Event::End(BytesEnd::new("head")))?;

    writer.write_event(Event::Start(BytesStart::new("body")))?;
    let mut div = BytesStart::new("div");
    div.push_attribute(("id", cover.id_image.as_str()));
    writer.write_event(Event::Start(div))?;

    let mut img = BytesStart::new("img");
    img.push_attribute(("src", image_src.as_str()));
    img.push_attribute(("alt", cover.alt.as_deref().unwrap_or("")));
    writer.write_event(Event::Empty(img))?;

    writer.write_event(Event::End(BytesEnd::new("div")))?;
    writer.write_event(Event::End(BytesEnd::new("body")))?;
    writer.write_event(Event::End(BytesEnd::new("html")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
