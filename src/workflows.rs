// src/workflows.rs

use crate::{
    cli::{CertificateAction, CodeAction, CodeArgs, Command, CouponAction, CouponArgs, DiscountKind},
    client::RobustClient,
    config, constants,
    controller::AppController,
    error::{AppError, AppResult, CompletionBlock},
    models::{CouponDraft, DiscountType},
    symbols,
    tracker::CertificateOffer,
    ui, utils, views,
};
use anyhow::Context;
use chrono::Utc;
use colored::*;
use log::{debug, info, warn};
use std::{fs, path::Path};

/// 执行单条命令
pub(crate) async fn execute(
    command: &Command,
    controller: &mut AppController,
    http_client: &RobustClient,
) -> AppResult<()> {
    match command {
        Command::Courses { enrolled: true, .. } => {
            with_spinner("正在加载我的课程...", controller.load_enrolled()).await?;
            views::render_enrolled(&controller.state().student.enrolled);
        }
        Command::Courses { search, .. } => {
            with_spinner("正在加载课程目录...", controller.load_catalog(search.as_deref())).await?;
            views::render_catalog(&controller.state().catalog.courses);
        }
        Command::Course { slug } => {
            with_spinner("正在加载课程...", controller.load_course_detail(slug)).await?;
            if let Some(course) = controller.state().catalog.details.get(slug) {
                views::render_course_preview(course);
            }
        }
        Command::Progress { slug } => {
            with_spinner("正在加载课程进度...", controller.load_dashboard(slug)).await?;
            views::render_outline(&controller.tracker(slug)?);
        }
        Command::Complete { slug, lesson_id } => {
            controller.load_progress(slug).await?;
            controller.complete_lesson(slug, lesson_id).await?;
            ui::notify_ok(&format!("课时已完成，当前进度 {}%", controller.tracker(slug)?.progress_percentage()));
        }
        Command::Incomplete { slug, lesson_id } => {
            controller.load_progress(slug).await?;
            controller.incomplete_lesson(slug, lesson_id).await?;
            ui::notify_ok(&format!("课时已标记为未完成，当前进度 {}%", controller.tracker(slug)?.progress_percentage()));
        }
        Command::Quiz { slug, lesson_id, answers, complete } => {
            controller.load_progress(slug).await?;
            take_quiz(controller, slug, lesson_id, answers.as_deref()).await?;
            if *complete {
                complete_if_passed(controller, slug, lesson_id).await?;
            }
        }
        Command::Code { action } => run_code_action(controller, action).await?,
        Command::Study { slug } => run_study_session(controller, slug).await?,
        Command::Certificate { action } => run_certificate_action(controller, action).await?,
        Command::Plans => {
            with_spinner("正在加载套餐...", controller.load_plans()).await?;
            views::render_plans(&controller.state().subscriptions);
        }
        Command::Subscription => {
            controller.load_subscription().await?;
            views::render_subscription(controller.state().subscriptions.current.as_ref());
        }
        Command::Subscribe { plan_id, coupon } => {
            if let Some(code) = coupon {
                let validation = controller.validate_coupon(code, Some(plan_id)).await?;
                views::render_coupon_validation(&validation, None);
            }
            controller.subscribe(plan_id, coupon.as_deref()).await?;
            ui::notify_ok("订阅成功");
            views::render_subscription(controller.state().subscriptions.current.as_ref());
        }
        Command::Unsubscribe { yes } => {
            if !*yes && !ui::confirm("确定要取消当前订阅吗?", false) {
                println!("{} 已放弃取消订阅。", *symbols::INFO);
                return Ok(());
            }
            controller.cancel_subscription().await?;
            ui::notify_ok("订阅已取消");
            views::render_subscription(controller.state().subscriptions.current.as_ref());
        }
        Command::Coupon { action } => run_coupon_action(controller, action).await?,
        Command::Ads { placement } => {
            controller.load_ads(placement.as_deref()).await?;
            let count = controller.state().ads.ads.len();
            for i in 0..count.max(1) {
                if i > 0 {
                    controller.rotate_ad();
                }
                views::render_ads(&controller.state().ads);
            }
        }
        Command::Announcements => {
            controller.load_announcements().await?;
            views::render_announcements(&controller.state().ads);
        }
        Command::Faq { category } => {
            controller.load_faq(category.as_deref()).await?;
            // 非交互输出时全部展开
            let ids: Vec<String> = controller.state().faq.entries.iter().map(|f| f.id.clone()).collect();
            for id in ids {
                controller.toggle_faq(&id);
            }
            views::render_faq(&controller.state().faq);
        }
        Command::History { page, limit } => {
            controller.load_admin_history(*page, *limit).await?;
            if let Some(page) = &controller.state().admin.page {
                views::render_history(page);
            }
        }
        Command::Login => login(http_client).await?,
        // 本地命令在创建客户端之前已处理
        Command::Logout | Command::TokenHelp => {}
    }
    Ok(())
}

async fn with_spinner<F, T>(message: &str, fut: F) -> AppResult<T>
where
    F: std::future::Future<Output = AppResult<T>>,
{
    let pb = ui::spinner(message);
    let result = fut.await;
    pb.finish_and_clear();
    result
}

/// 输入新 Token，并用“我的课程”接口探测是否有效
async fn login(http_client: &RobustClient) -> AppResult<()> {
    let token = ui::prompt_hidden("请输入 Access Token (输入不可见，完成后按回车)")
        .map_err(|_| AppError::UserInterrupt)?;
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AppError::UserInputError("Token 不能为空".to_string()));
    }

    let session = http_client.session_token();
    *session.lock().await = Some(token.clone());
    let probe: AppResult<serde_json::Value> = http_client
        .get_json(constants::api::student::COURSES, &[], &[])
        .await;
    match probe {
        Ok(_) => {
            config::token::save_token(&token)?;
            ui::notify_ok("Token 有效，已保存至本地配置。");
            Ok(())
        }
        Err(AppError::Unauthorized) => {
            Err(AppError::UserInputError("Token 无效，请重新获取。".to_string()))
        }
        Err(e) => Err(e),
    }
}

async fn take_quiz(
    controller: &mut AppController,
    slug: &str,
    lesson_id: &str,
    answers: Option<&str>,
) -> AppResult<()> {
    let quiz = {
        let tracker = controller.tracker(slug)?;
        let lesson = tracker
            .lesson(lesson_id)
            .ok_or_else(|| AppError::UserInputError(format!("课时 '{}' 不存在", lesson_id)))?;
        if lesson.is_locked() {
            return Err(AppError::CompletionNotAllowed(CompletionBlock::Locked));
        }
        lesson
            .quiz()
            .cloned()
            .ok_or_else(|| AppError::QuizState(format!("课时 '{}' 不是测验", lesson.title)))?
    };

    let option_counts: Vec<usize> = quiz.questions.iter().map(|q| q.options.len()).collect();
    let selections = match answers {
        Some(input) => utils::parse_answer_list(input, &option_counts)?,
        None => {
            let mut picked = Vec::with_capacity(quiz.questions.len());
            for (i, q) in quiz.questions.iter().enumerate() {
                println!("\n{}. {}", i + 1, q.question.bold());
                for (j, option) in q.options.iter().enumerate() {
                    println!("   {}) {}", j + 1, option);
                }
                loop {
                    let input = ui::prompt("请选择", None).map_err(|_| AppError::UserInterrupt)?;
                    match utils::parse_answer_list(&input, &[q.options.len()]) {
                        Ok(v) => {
                            picked.push(v[0]);
                            break;
                        }
                        Err(e) => ui::notify_error(&e),
                    }
                }
            }
            picked
        }
    };

    // 已提交过的测验在本次会话中重新作答
    if controller
        .state()
        .student
        .course(slug)
        .and_then(|s| s.quiz(lesson_id))
        .is_some_and(|s| s.result().is_some())
    {
        controller.retake_quiz(slug, lesson_id)?;
    }
    for (q, option) in quiz.questions.iter().zip(selections) {
        controller.answer_question(slug, lesson_id, &q.id, option)?;
    }
    let result = controller.submit_quiz(slug, lesson_id).await?;
    views::render_quiz_result(&result);
    Ok(())
}

async fn complete_if_passed(controller: &mut AppController, slug: &str, lesson_id: &str) -> AppResult<()> {
    let can_complete = controller.tracker(slug)?.can_complete_lesson(lesson_id);
    match can_complete {
        Ok(()) => {
            controller.complete_lesson(slug, lesson_id).await?;
            ui::notify_ok(&format!(
                "课时已完成，当前进度 {}%",
                controller.tracker(slug)?.progress_percentage()
            ));
        }
        Err(block) => {
            debug!("课时 '{}' 未标记完成: {}", lesson_id, block);
            println!("{} 课时未标记完成: {}", *symbols::INFO, block);
        }
    }
    Ok(())
}

fn read_source(path: &Path) -> AppResult<String> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("读取源代码文件 '{}' 失败", path.display()))?;
    Ok(code)
}

async fn run_code_action(controller: &mut AppController, action: &CodeAction) -> AppResult<()> {
    let (args, submit, complete): (&CodeArgs, bool, bool) = match action {
        CodeAction::Run(args) => (args, false, false),
        CodeAction::Submit { args, complete } => (args, true, *complete),
    };
    let code = read_source(&args.file)?;
    controller.load_progress(&args.slug).await?;
    controller.edit_code(&args.slug, &args.lesson_id, code, args.language.clone())?;

    if submit {
        let result = with_spinner("正在评测...", controller.submit_code(&args.slug, &args.lesson_id)).await?;
        views::render_coding_result("提交结果", &result);
        if complete {
            complete_if_passed(controller, &args.slug, &args.lesson_id).await?;
        }
    } else {
        let result = with_spinner("正在运行...", controller.run_code(&args.slug, &args.lesson_id)).await?;
        views::render_coding_result("运行结果", &result);
    }
    Ok(())
}

async fn run_certificate_action(controller: &mut AppController, action: &CertificateAction) -> AppResult<()> {
    match action {
        CertificateAction::Issue { slug } => {
            controller.load_dashboard(slug).await?;
            let already_issued = matches!(
                controller.tracker(slug)?.certificate_offer(),
                CertificateOffer::Issued(_)
            );
            let cert = controller.issue_certificate(slug).await?;
            if already_issued {
                println!("{} 该课程已颁发过证书。", *symbols::INFO);
            }
            views::render_certificate(&cert);
        }
        CertificateAction::List => {
            controller.load_certificates().await?;
            views::render_certificates(&controller.state().certificates.list());
        }
        CertificateAction::Verify { token } => {
            controller.verify_certificate(token).await?;
            if let Some(v) = &controller.state().certificates.verification {
                views::render_verification(v);
            }
        }
        CertificateAction::Download { id, output } => {
            let path = controller.download_certificate(id, output).await?;
            ui::notify_ok(&format!("证书已保存至 {}", path.display()));
        }
    }
    Ok(())
}

fn build_coupon_draft(args: &CouponArgs) -> AppResult<CouponDraft> {
    if args.value <= 0.0 {
        return Err(AppError::UserInputError("折扣值必须大于 0".to_string()));
    }
    let discount_type = match args.discount_type {
        DiscountKind::Percentage => {
            if args.value > 100.0 {
                return Err(AppError::UserInputError("百分比折扣不能超过 100".to_string()));
            }
            DiscountType::Percentage
        }
        DiscountKind::Fixed => DiscountType::Fixed,
    };
    // 过期日期按当天结束计算
    let expires_at = args
        .expires
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc());
    Ok(CouponDraft {
        code: args.code.trim().to_uppercase(),
        discount_type,
        discount_value: args.value,
        expires_at,
        usage_limit: args.usage_limit,
        is_active: !args.inactive,
    })
}

async fn run_coupon_action(controller: &mut AppController, action: &CouponAction) -> AppResult<()> {
    match action {
        CouponAction::Validate { code, plan } => {
            if plan.is_some() {
                controller.load_plans().await?;
            }
            let validation = controller.validate_coupon(code, plan.as_deref()).await?;
            let price = plan
                .as_deref()
                .and_then(|p| controller.state().subscriptions.plan(p))
                .map(|p| p.price);
            views::render_coupon_validation(&validation, price);
            if !validation.coupon.is_usable(Utc::now()) {
                warn!("服务器认为优惠券 '{}' 有效，但本地检查显示已过期或用尽", code);
            }
        }
        CouponAction::List => {
            controller.load_coupons().await?;
            views::render_coupons(&controller.state().coupons.coupons);
        }
        CouponAction::Create(args) => {
            let draft = build_coupon_draft(args)?;
            let coupon = controller.create_coupon(&draft).await?;
            ui::notify_ok(&format!("优惠券 {} 已创建", coupon.code));
        }
        CouponAction::Update { id, args } => {
            let draft = build_coupon_draft(args)?;
            let coupon = controller.update_coupon(id, &draft).await?;
            ui::notify_ok(&format!("优惠券 {} 已更新", coupon.code));
        }
        CouponAction::Delete { id, yes } => {
            if !*yes && !ui::confirm(&format!("确定删除优惠券 '{}' 吗?", id), false) {
                return Ok(());
            }
            controller.delete_coupon(id).await?;
            ui::notify_ok("优惠券已删除");
        }
    }
    Ok(())
}

const STUDY_HELP: &[&str] = &[
    "ls                 显示课程大纲与进度",
    "open <n>           查看第 n 个课时",
    "done <n>           标记第 n 个课时为已完成",
    "undo <n>           标记第 n 个课时为未完成",
    "quiz <n>           作答第 n 个课时的测验 (已提交则重做)",
    "run <n> <文件>     运行编程题代码",
    "submit <n> <文件>  提交编程题代码",
    "cert               申请或查看证书",
    "reload             从服务器重新加载进度",
    "help               显示本帮助",
    "(空行)             退出",
];

/// 交互式学习会话：所有操作共享同一个控制器状态
async fn run_study_session(controller: &mut AppController, slug: &str) -> AppResult<()> {
    with_spinner("正在加载课程进度...", controller.load_dashboard(slug)).await?;
    views::render_outline(&controller.tracker(slug)?);
    ui::box_message("学习会话", STUDY_HELP, |s| s.cyan());

    loop {
        let input = match ui::prompt(&format!("[{}] 输入命令", slug), None) {
            Ok(input) if !input.is_empty() => input,
            Ok(_) => break,
            Err(_) => return Err(AppError::UserInterrupt),
        };
        let result = handle_study_command(controller, slug, &input).await;
        if let Err(e) = result {
            log::error!("学习会话命令 '{}' 失败: {}", input, e);
            ui::notify_error(&e);
            if e.is_session_fatal() {
                return Err(e);
            }
        }
    }

    println!("\n{} 退出学习会话。", *symbols::INFO);
    Ok(())
}

fn lesson_id_at(controller: &AppController, slug: &str, arg: Option<&str>) -> AppResult<String> {
    let n: usize = arg
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::UserInputError("请提供课时编号，例如 'open 3'".to_string()))?;
    let tracker = controller.tracker(slug)?;
    views::lesson_by_index(&tracker.state().course, n)
        .map(|l| l.id.clone())
        .ok_or_else(|| AppError::UserInputError(format!("课时编号 {} 不存在", n)))
}

async fn handle_study_command(controller: &mut AppController, slug: &str, input: &str) -> AppResult<()> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next();
    match cmd {
        "ls" => views::render_outline(&controller.tracker(slug)?),
        "help" => ui::box_message("学习会话", STUDY_HELP, |s| s.cyan()),
        "open" => {
            let id = lesson_id_at(controller, slug, arg)?;
            let tracker = controller.tracker(slug)?;
            if let Some(lesson) = tracker.lesson(&id) {
                views::render_lesson(&tracker, lesson);
            }
        }
        "done" => {
            let id = lesson_id_at(controller, slug, arg)?;
            controller.complete_lesson(slug, &id).await?;
            ui::notify_ok(&format!("已完成，当前进度 {}%", controller.tracker(slug)?.progress_percentage()));
            if matches!(controller.tracker(slug)?.certificate_offer(), CertificateOffer::Available) {
                println!("{} {}", *symbols::OK, "全部课时已完成，输入 'cert' 申请证书。".green());
            }
        }
        "undo" => {
            let id = lesson_id_at(controller, slug, arg)?;
            controller.incomplete_lesson(slug, &id).await?;
            ui::notify_ok(&format!("已标记为未完成，当前进度 {}%", controller.tracker(slug)?.progress_percentage()));
        }
        "quiz" => {
            let id = lesson_id_at(controller, slug, arg)?;
            take_quiz(controller, slug, &id, None).await?;
            if controller.tracker(slug)?.can_complete_lesson(&id).is_ok() {
                println!("{} 测验已通过，输入 'done {}' 标记完成。", *symbols::INFO, arg.unwrap_or_default());
            }
        }
        "run" | "submit" => {
            let id = lesson_id_at(controller, slug, arg)?;
            let file = parts
                .next()
                .ok_or_else(|| AppError::UserInputError(format!("用法: {} <n> <文件>", cmd)))?;
            let code = read_source(Path::new(file))?;
            controller.edit_code(slug, &id, code, None)?;
            if cmd == "run" {
                let result = controller.run_code(slug, &id).await?;
                views::render_coding_result("运行结果", &result);
            } else {
                let result = controller.submit_code(slug, &id).await?;
                views::render_coding_result("提交结果", &result);
            }
        }
        "cert" => {
            let cert = controller.issue_certificate(slug).await?;
            views::render_certificate(&cert);
        }
        "reload" => {
            controller.load_dashboard(slug).await?;
            views::render_outline(&controller.tracker(slug)?);
        }
        other => {
            info!("未知的学习会话命令: {}", other);
            return Err(AppError::UserInputError(format!("未知命令 '{}'，输入 help 查看帮助", other)));
        }
    }
    Ok(())
}
