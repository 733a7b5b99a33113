// src/cli.rs

use crate::constants;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 提供访问令牌 (Access Token)，优先级最高
    #[arg(long, global = true, help_heading = "General")]
    pub token: Option<String>,
    /// 指定后端 API 地址，例如 https://learn.example.com/api/v1
    #[arg(long, value_name = "URL", global = true, help_heading = "General")]
    pub api_url: Option<String>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 浏览课程目录
    Courses {
        /// 只显示已报名的课程及进度
        #[arg(long)]
        enrolled: bool,
        /// 按关键字搜索
        #[arg(long, conflicts_with = "enrolled")]
        search: Option<String>,
    },
    /// 查看课程大纲 (无需报名)
    Course { slug: String },
    /// 查看学习进度
    Progress { slug: String },
    /// 将课时标记为已完成
    Complete { slug: String, lesson_id: String },
    /// 将课时标记为未完成
    Incomplete { slug: String, lesson_id: String },
    /// 作答并提交测验
    Quiz {
        slug: String,
        lesson_id: String,
        /// 按题目顺序给出选项序号，例如 '2,1,3'；省略时逐题提问
        #[arg(long)]
        answers: Option<String>,
        /// 通过后自动标记课时完成
        #[arg(long)]
        complete: bool,
    },
    /// 运行或提交编程题代码
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },
    /// 进入交互式学习会话
    Study { slug: String },
    /// 证书相关操作
    Certificate {
        #[command(subcommand)]
        action: CertificateAction,
    },
    /// 列出订阅套餐
    Plans,
    /// 查看当前订阅
    Subscription,
    /// 订阅套餐
    Subscribe {
        plan_id: String,
        /// 使用优惠券
        #[arg(long)]
        coupon: Option<String>,
    },
    /// 取消当前订阅
    Unsubscribe {
        /// 跳过确认
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// 优惠券相关操作
    Coupon {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// 查看正在投放的广告
    Ads {
        #[arg(long)]
        placement: Option<String>,
    },
    /// 查看平台公告
    Announcements,
    /// 常见问题
    Faq {
        #[arg(long)]
        category: Option<String>,
    },
    /// [管理员] 查看操作记录
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// 输入并保存 Access Token
    Login,
    /// 清除本地保存的 Access Token
    Logout,
    /// 显示如何获取 Access Token 的指南
    TokenHelp,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CodeAction {
    /// 运行代码 (不计分、不保存)
    Run(CodeArgs),
    /// 提交代码评分
    Submit {
        #[command(flatten)]
        args: CodeArgs,
        /// 通过后自动标记课时完成
        #[arg(long)]
        complete: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CodeArgs {
    pub slug: String,
    pub lesson_id: String,
    /// 源代码文件
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// 编程语言，默认使用题目指定的语言
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CertificateAction {
    /// 为已完成的课程申请证书
    Issue { slug: String },
    /// 列出我的证书
    List,
    /// 通过验证码验证证书 (无需登录)
    Verify { token: String },
    /// 下载证书 PDF
    Download {
        id: String,
        /// 保存目录
        #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_DOWNLOAD_DIR))]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CouponAction {
    /// 验证优惠券并显示折后价格
    Validate {
        code: String,
        #[arg(long)]
        plan: Option<String>,
    },
    /// [管理员] 列出优惠券
    List,
    /// [管理员] 创建优惠券
    Create(CouponArgs),
    /// [管理员] 更新优惠券
    Update {
        id: String,
        #[command(flatten)]
        args: CouponArgs,
    },
    /// [管理员] 删除优惠券
    Delete {
        id: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CouponArgs {
    pub code: String,
    #[arg(long, value_enum)]
    pub discount_type: DiscountKind,
    #[arg(long)]
    pub value: f64,
    /// 过期日期，例如 2026-12-31
    #[arg(long)]
    pub expires: Option<NaiveDate>,
    #[arg(long)]
    pub usage_limit: Option<u32>,
    /// 创建为停用状态
    #[arg(long)]
    pub inactive: bool,
}
