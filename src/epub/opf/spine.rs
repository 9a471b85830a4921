//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义与构建。
//! 脊柱顺序由插入顺序决定：目录遍历按先序追加章节即可。

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
}

impl SpineItem {
    /// 创建新的脊柱项
    pub fn new(idref: String) -> Self {
        Self {
            idref,
            linear: true,
        }
    }

    /// 创建非线性的脊柱项
    pub fn new_non_linear(idref: String) -> Self {
        Self {
            idref,
            linear: false,
        }
    }

    /// 创建指定线性属性的脊柱项
    pub fn with_linear(idref: String, linear: bool) -> Self {
        Self { idref, linear }
    }

    /// 检查是否为线性阅读
    pub fn is_linear(&self) -> bool {
        self.linear
    }
}

/// 书籍包的脊柱(有序的阅读顺序列表)
#[derive(Debug, Default)]
pub struct Spine {
    items: Vec<SpineItem>,
}

impl Spine {
    /// 创建空脊柱
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// 在末尾追加一个脊柱项
    pub fn push(&mut self, item: SpineItem) {
        self.items.push(item);
    }

    /// 按插入顺序返回所有脊柱项
    pub fn items(&self) -> &[SpineItem] {
        &self.items
    }

    /// 脊柱项数量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 脊柱是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
