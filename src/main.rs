use bindery::{BookMetadata, EpubBuilder, MemoryIndex, Result};
use clap::Parser;
use std::path::PathBuf;

/// 📚 Bindery - EPUB组装工具
#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "一个用于组装EPUB电子书的Rust工具")]
#[command(version)]
struct Args {
    /// 书籍元数据文件路径
    #[arg(help = "书籍元数据YAML文件的路径")]
    metadata_file: PathBuf,

    /// 文档索引文件路径
    #[arg(short, long, help = "文档索引YAML文件的路径")]
    index: PathBuf,

    /// 输出布局目录
    #[arg(short, long, default_value = "out", help = "已渲染文档所在的输出布局目录")]
    layout: PathBuf,

    /// EPUB归档输出路径
    #[arg(short, long, default_value = "book.epub", help = "EPUB文件的写入路径")]
    output: PathBuf,

    /// 额外的资源扫描根目录
    #[arg(short, long, help = "资源扫描根目录（可指定多个，默认扫描输出布局目录）")]
    assets: Vec<PathBuf>,

    /// 打印导航标记
    #[arg(long, help = "打印追加到目录文档的导航标记")]
    print_nav: bool,

    /// 详细输出模式
    #[arg(short, long, help = "显示详细信息")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    println!("📚 Bindery - EPUB组装工具");

    if args.verbose {
        println!("🔍 详细模式已启用");
    }

    println!("正在组装EPUB: {}", args.output.display());

    match build_epub(&args) {
        Ok(_) => println!("🎉 EPUB组装完成！"),
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_epub(args: &Args) -> Result<()> {
    // 加载书籍元数据与文档索引
    let metadata = BookMetadata::from_path(&args.metadata_file)?;
    let mut index = MemoryIndex::from_path(&args.index)?;

    if args.verbose {
        println!("\n📖 书名: {}", metadata.title);
        println!("📁 文档索引: 共{}个文档", index.len());
    }

    let mut builder = EpubBuilder::new(&args.layout);
    if !args.assets.is_empty() {
        builder = builder.with_asset_roots(&args.assets);
    }

    let context = builder.build(metadata, &mut index, &args.output)?;

    println!("\n📦 组装结果:");
    println!("  清单条目: {}个", context.manifest.len());
    println!("  脊柱条目: {}个", context.spine.len());
    if let Some(toc) = &context.toc {
        let chapter_count = toc.flatten().len();
        println!("  章节数量: {}个 (最大嵌套深度: {})", chapter_count, toc.max_depth());
    }

    if args.verbose {
        println!("\n📋 清单内容:");
        for (i, item) in context.manifest.items().iter().enumerate() {
            println!("  {}. [{}] {} ({})", i + 1, item.id, item.href, item.media_type);
        }
    }

    if args.print_nav {
        if let Some(nav) = &context.nav_markup {
            println!("\n🌳 导航标记:\n{}", nav);
        }
    }

    println!("\n✅ 已写入: {}", args.output.display());

    Ok(())
}
