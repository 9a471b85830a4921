//! 书籍配置校验模块
//!
//! 在构建开始之前对书籍元数据做预检，并就地补全缺失的字段
//! （自动生成的唯一标识符、出版/修改时间）。
//! 校验按固定顺序执行，遇到第一个失败立即中止。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::metadata::{BookMetadata, Identifier};
use time::OffsetDateTime;

/// 校验并补全书籍元数据
///
/// # 校验顺序
/// 1. OPF包描述文件的输出路径必须已配置
/// 2. 标识符：没有任何标识符时自动生成一个标记为唯一的
///    `urn:uuid:`标识符；已有标识符时要求恰好一个标记为唯一
/// 3. 时间：没有出版日期时将出版日期与修改日期都设为当前时间；
///    已有出版日期时只刷新修改日期
/// 4. 必须配置了目录文档且其路径非空
///
/// # 参数
/// * `metadata` - 待校验的书籍元数据，会被就地修改
pub fn validate(metadata: &mut BookMetadata) -> Result<()> {
    if metadata.opf.is_empty() {
        return Err(EpubError::ConfigError(
            "未指定OPF包描述文件的输出路径".to_string(),
        ));
    }

    if metadata.identifiers.is_empty() {
        metadata.identifiers.push(Identifier {
            value: format!("urn:uuid:{}", time_based_uuid()),
            scheme: None,
            unique: true,
        });
    } else {
        let unique_count = metadata.identifiers.iter().filter(|i| i.unique).count();
        if unique_count != 1 {
            return Err(EpubError::ConfigError(format!(
                "唯一标识符必须恰好一个, 实际标记了{}个",
                unique_count
            )));
        }
    }

    let rightnow = w3c_date_format(OffsetDateTime::now_utc());
    if metadata.published.date.is_none() {
        metadata.published.date = Some(rightnow.clone());
    }
    metadata.published.modified = Some(rightnow);

    match &metadata.toc {
        Some(toc) if !toc.href.is_empty() => Ok(()),
        _ => Err(EpubError::ConfigError("未配置目录文档".to_string())),
    }
}

/// 将UTC时间格式化为W3C日期格式(`YYYY-MM-DDThh:mm:ssZ`)
pub fn w3c_date_format(datetime: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        datetime.year(),
        datetime.month() as u8,
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second()
    )
}

/// 生成基于时间的UUID(版本1布局)
///
/// 时间戳取当前UTC时间，时钟序列与节点字段由简单的PRNG填充。
/// 不具备密码学强度，作为书籍标识符足够。
fn time_based_uuid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    // UUID时间戳以100纳秒为单位，起点是公历1582-10-15
    let timestamp = (nanos / 100) as u64 + 0x01B2_1DD2_1381_4000;
    let time_low = (timestamp & 0xFFFF_FFFF) as u32;
    let time_mid = ((timestamp >> 32) & 0xFFFF) as u16;
    let time_hi_and_version = (((timestamp >> 48) & 0x0FFF) as u16) | 0x1000;

    let mut state = (nanos as u64) ^ 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    let clock_seq = ((next() as u16) & 0x3FFF) | 0x8000;
    let node_hi = next() as u16;
    let node_low = next();

    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:04x}{:08x}",
        time_low, time_mid, time_hi_and_version, clock_seq, node_hi, node_low
    )
}
