use crate::epub::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;

/// OPF包描述文件的媒体类型
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// META-INF/container.xml的内容模型
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 为指定的OPF包描述文件创建Container
    ///
    /// # 参数
    /// * `opf_path` - OPF文件在书籍包内的路径
    pub fn for_package(opf_path: &str) -> Container {
        Container {
            rootfiles: vec![RootFile {
                full_path: opf_path.to_string(),
                media_type: OPF_MEDIA_TYPE.to_string(),
            }],
        }
    }

    /// 渲染container.xml的内容
    ///
    /// # 返回值
    /// * `Result<String, EpubError>` - 渲染后的XML文本
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut container = BytesStart::new("container");
        container.push_attribute(("version", "1.0"));
        container.push_attribute((
            "xmlns",
            "urn:oasis:names:tc:opendocument:xmlns:container",
        ));
        writer.write_event(Event::Start(container))?;
        writer.write_event(Event::Start(BytesStart::new("rootfiles")))?;

        for rootfile in &self.rootfiles {
            let mut elem = BytesStart::new("rootfile");
            elem.push_attribute(("full-path", rootfile.full_path.as_str()));
            elem.push_attribute(("media-type", rootfile.media_type.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rootfiles")))?;
        writer.write_event(Event::End(BytesEnd::new("container")))?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_to_xml() {
        let container = Container::for_package("book.opf");
        let xml = container.to_xml().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("full-path=\"book.opf\""));
        assert!(xml.contains("media-type=\"application/oebps-package+xml\""));
        assert!(xml.contains("urn:oasis:names:tc:opendocument:xmlns:container"));
    }

    #[test]
    fn test_container_for_nested_package() {
        let container = Container::for_package("OEBPS/content.opf");
        let xml = container.to_xml().unwrap();
        assert!(xml.contains("full-path=\"OEBPS/content.opf\""));
    }
}
