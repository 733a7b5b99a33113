// src/views.rs

//! 终端视图：只读取状态与跟踪器查询并输出，不发起任何请求。

use crate::{
    constants,
    models::{
        AdminHistoryEntry, Certificate, CertificateVerification, CodingResult, Coupon, Course,
        CourseSummary, DiscountType, Lesson, LessonBody, LessonState, Page, QuizResult,
        Subscription, api::CouponValidation,
    },
    store::{AdsState, FaqState, SubscriptionState},
    symbols,
    tracker::{CertificateOffer, CourseTracker},
    ui, utils,
};
use chrono::{DateTime, Utc};
use colored::*;
use itertools::Itertools;

const BAR_WIDTH: usize = 30;

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_price(price: f64, currency: &str) -> String {
    format!("{:.2} {}", price, currency)
}

pub fn render_catalog(courses: &[CourseSummary]) {
    ui::print_header(&format!("课程目录 (共 {} 门)", courses.len()));
    if courses.is_empty() {
        println!("{} 没有找到课程。", *symbols::INFO);
        return;
    }
    for course in courses {
        let price = match (course.is_free, course.price) {
            (true, _) | (false, None) => "免费".green().to_string(),
            (false, Some(p)) => format!("{:.2}", p).yellow().to_string(),
        };
        println!(
            "  {} {} [{}]",
            course.slug.cyan(),
            utils::truncate_text(&course.title, constants::TITLE_TRUNCATE_LENGTH),
            price
        );
        if let Some(instructor) = &course.instructor {
            println!("      讲师: {}", instructor);
        }
    }
}

pub fn render_enrolled(courses: &[CourseSummary]) {
    ui::print_header(&format!("我的课程 (共 {} 门)", courses.len()));
    if courses.is_empty() {
        println!("{} 尚未报名任何课程。", *symbols::INFO);
        return;
    }
    for course in courses {
        let pct = course.progress.unwrap_or(0.0).clamp(0.0, 100.0) as u8;
        println!(
            "  {:<24} {} {}",
            course.slug.cyan(),
            utils::progress_bar_text(pct, 20),
            utils::truncate_text(&course.title, 40)
        );
    }
}

/// 未报名时的课程大纲，只列出结构
pub fn render_course_preview(course: &Course) {
    ui::print_header(&course.title);
    for chapter in &course.chapters {
        ui::print_sub_header(&chapter.title);
        for lesson in &chapter.lessons {
            let marker = if lesson.is_locked() { &*symbols::LOCKED } else { &*symbols::TODO };
            println!("  {} {} ({})", marker, lesson.title, lesson.kind().label());
        }
    }
}

fn lesson_marker(state: LessonState) -> &'static ColoredString {
    match state {
        LessonState::Complete => &*symbols::DONE,
        LessonState::Incomplete => &*symbols::TODO,
        LessonState::Locked => &*symbols::LOCKED,
    }
}

/// 课程大纲与进度。课时按出现顺序从 1 开始编号，交互模式中用编号引用课时
pub fn render_outline(tracker: &CourseTracker<'_>) {
    let course = &tracker.state().course;
    ui::print_header(&course.title);
    println!(
        "  进度 {}  ({}/{})",
        utils::progress_bar_text(tracker.progress_percentage(), BAR_WIDTH),
        tracker.completed_lessons(),
        tracker.total_lessons()
    );

    let mut index = 0;
    for chapter in &course.chapters {
        let title = if tracker.is_chapter_completed(chapter) {
            format!("{} {}", chapter.title, "(已完成)".green())
        } else {
            chapter.title.clone()
        };
        ui::print_sub_header(&title);
        for lesson in &chapter.lessons {
            index += 1;
            let state = tracker.lesson_state(lesson);
            let mut line = format!(
                "  {:>3}. {} {} ({})",
                index,
                lesson_marker(state),
                lesson.title,
                lesson.kind().label()
            );
            if state != LessonState::Locked
                && lesson.kind().is_assessment()
                && tracker.has_passing_submission(lesson)
            {
                line.push_str(&format!(" {}", "已通过".green()));
            }
            println!("{}", line);
        }
    }

    println!();
    render_certificate_offer(&tracker.certificate_offer());
}

pub fn render_certificate_offer(offer: &CertificateOffer<'_>) {
    match offer {
        CertificateOffer::Locked { progress } => println!(
            "{} 证书: 完成全部课时后可申请 (当前 {}%)",
            *symbols::INFO,
            progress
        ),
        CertificateOffer::Available => println!(
            "{} {}",
            *symbols::OK,
            "课程已全部完成，可以申请证书了！".green()
        ),
        CertificateOffer::Issued(cert) => println!(
            "{} 已获得证书，验证码: {}",
            *symbols::OK,
            cert.verification_token.cyan()
        ),
    }
}

/// 按编号查找课时
pub fn lesson_by_index<'a>(course: &'a Course, index: usize) -> Option<&'a Lesson> {
    index.checked_sub(1).and_then(|i| course.lessons().nth(i))
}

pub fn render_lesson(tracker: &CourseTracker<'_>, lesson: &Lesson) {
    ui::print_sub_header(&format!("{} ({})", lesson.title, lesson.kind().label()));
    if lesson.is_locked() {
        println!("{} 内容已锁定，请购买或订阅后学习。", *symbols::LOCKED);
        return;
    }
    match &lesson.body {
        LessonBody::Video { content: Some(video) } => {
            println!("  视频地址: {}", video.url.underline());
            if let Some(secs) = video.duration {
                println!("  时长: {}:{:02}", secs / 60, secs % 60);
            }
        }
        LessonBody::Article { content: Some(article) } => {
            for line in article.text.lines() {
                println!("  {}", line);
            }
        }
        LessonBody::Quiz { content: Some(quiz) } => {
            println!("  共 {} 题，及格分 {}", quiz.questions.len(), quiz.pass_score);
            let answers = tracker.state().quiz(&lesson.id).and_then(|s| s.answers());
            for (i, q) in quiz.questions.iter().enumerate() {
                println!("  {}. {}", i + 1, q.question);
                let chosen = answers.and_then(|a| a.get(&q.id)).copied();
                for (j, option) in q.options.iter().enumerate() {
                    let mark = if chosen == Some(j) { "●" } else { "○" };
                    println!("      {} {}) {}", mark, j + 1, option);
                }
            }
            if let Some(result) = tracker.state().quiz(&lesson.id).and_then(|s| s.result()) {
                render_quiz_result(result);
            }
        }
        LessonBody::CodingProblem { content: Some(problem) } => {
            for line in problem.statement.lines() {
                println!("  {}", line);
            }
            println!("  语言: {}", problem.language);
            if let Some(session) = tracker.state().coding_session(&lesson.id) {
                if let Some(run) = &session.last_run {
                    render_coding_result("最近一次运行", run);
                }
                if let Some(sub) = &session.last_submission {
                    render_coding_result("最近一次提交", sub);
                }
            }
        }
        _ => {}
    }
    if !lesson.resources.is_empty() {
        println!("  附件: {}", lesson.resources.iter().map(|r| &r.title).join(", "));
    }
}

pub fn render_quiz_result(result: &QuizResult) {
    let summary = match result.pass_score {
        Some(pass) => format!("得分 {:.0} (及格分 {})", result.score, pass),
        None => format!("得分 {:.0}", result.score),
    };
    if result.is_passed {
        println!("{} {} {}", *symbols::OK, summary, "通过".green());
    } else {
        println!("{} {} {}", *symbols::WARN, summary, "未通过，可以重做".yellow());
    }
}

pub fn render_coding_result(label: &str, result: &CodingResult) {
    let status = if result.is_passed { "通过".green() } else { "未通过".red() };
    let score = result.score.map(|s| format!(" 得分 {:.0}", s)).unwrap_or_default();
    println!("  {}: {}{}", label, status, score);
    if let Some(msg) = &result.message {
        println!("    {}", msg);
    }
    if let Some(output) = result.output.as_deref().filter(|o| !o.is_empty()) {
        println!("    输出:");
        for line in output.lines() {
            println!("      {}", line.dimmed());
        }
    }
}

pub fn render_certificate(cert: &Certificate) {
    let lines = [
        format!("课程: {}", cert.course_title.as_deref().unwrap_or(&cert.course_id)),
        format!("学员: {}", cert.student_name.as_deref().unwrap_or("-")),
        format!("颁发日期: {}", format_date(cert.issued_at)),
        format!("证书编号: {}", cert.id),
        format!("验证码: {}", cert.verification_token),
    ];
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    ui::box_message("课程结业证书", &refs, |s| s.green());
}

pub fn render_certificates(list: &[&Certificate]) {
    ui::print_header(&format!("我的证书 (共 {} 张)", list.len()));
    for cert in list {
        println!(
            "  {} {} [{}] 验证码: {}",
            format_date(cert.issued_at),
            cert.course_title.as_deref().unwrap_or(&cert.course_id),
            cert.id,
            cert.verification_token.cyan()
        );
    }
}

pub fn render_verification(v: &CertificateVerification) {
    if v.valid {
        let lines = [
            format!("学员: {}", v.student_name.as_deref().unwrap_or("-")),
            format!("课程: {}", v.course_title.as_deref().unwrap_or("-")),
            format!("颁发日期: {}", format_date(v.issued_at)),
        ];
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        ui::box_message("证书有效", &refs, |s| s.green());
    } else {
        println!("{} {}", *symbols::ERROR, "证书无效或已被撤销。".red());
    }
}

pub fn render_plans(state: &SubscriptionState) {
    ui::print_header("订阅套餐");
    for plan in &state.plans {
        let interval = plan.interval.as_deref().unwrap_or("-");
        let price = state.price_for(&plan.id).unwrap_or(plan.price);
        let price_text = if (price - plan.price).abs() > f64::EPSILON {
            format!(
                "{} {}",
                format_price(plan.price, &plan.currency).strikethrough(),
                format_price(price, &plan.currency).green()
            )
        } else {
            format_price(price, &plan.currency)
        };
        println!("  {} {} / {}  [{}]", plan.name.bold(), price_text, interval, plan.id);
        for feature in &plan.features {
            println!("      - {}", feature);
        }
    }
}

pub fn render_subscription(sub: Option<&Subscription>) {
    let Some(sub) = sub else {
        println!("{} 当前没有订阅。", *symbols::INFO);
        return;
    };
    let plan = sub.plan.as_ref().map(|p| p.name.as_str()).unwrap_or("-");
    let status = format!("{:?}", sub.status);
    let status = if sub.is_active() { status.green() } else { status.yellow() };
    println!(
        "{} 套餐: {}  状态: {}  到期: {}",
        *symbols::INFO,
        plan,
        status,
        format_date(sub.current_period_end)
    );
}

fn describe_discount(coupon: &Coupon) -> String {
    match coupon.discount_type {
        DiscountType::Percentage => format!("{}% off", coupon.discount_value),
        DiscountType::Fixed => format!("-{:.2}", coupon.discount_value),
    }
}

pub fn render_coupon_validation(v: &CouponValidation, plan_price: Option<f64>) {
    println!(
        "{} 优惠券 {} 有效: {}",
        *symbols::OK,
        v.coupon.code.cyan(),
        describe_discount(&v.coupon)
    );
    let final_price = v
        .final_price
        .or_else(|| plan_price.map(|p| v.coupon.apply_to(p)));
    if let Some(price) = final_price {
        println!("    折后价格: {:.2}", price);
    }
}

pub fn render_coupons(coupons: &[Coupon]) {
    ui::print_header(&format!("优惠券 (共 {} 张)", coupons.len()));
    let now = Utc::now();
    for c in coupons {
        let usable = if c.is_usable(now) { "可用".green() } else { "不可用".red() };
        let usage = match c.usage_limit {
            Some(limit) => format!("{}/{}", c.used_count, limit),
            None => format!("{}/∞", c.used_count),
        };
        println!(
            "  {:<16} {:<12} 已用 {:<8} 到期 {}  {}  [{}]",
            c.code,
            describe_discount(c),
            usage,
            format_date(c.expires_at),
            usable,
            c.id
        );
    }
}

pub fn render_ads(state: &AdsState) {
    let Some(ad) = state.current_ad() else {
        println!("{} 当前没有广告。", *symbols::INFO);
        return;
    };
    let position = format!("{}/{}", state.cursor + 1, state.ads.len());
    let mut lines = vec![ad.title.clone()];
    if let Some(link) = &ad.link_url {
        lines.push(link.clone());
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    ui::box_message(&format!("广告 {}", position), &refs, |s| s.magenta());
}

pub fn render_announcements(state: &AdsState) {
    ui::print_header("平台公告");
    if state.announcements.is_empty() {
        println!("{} 暂无公告。", *symbols::INFO);
    }
    for a in &state.announcements {
        let pin = if a.pinned { "[置顶] ".red().to_string() } else { String::new() };
        println!("  {}{} ({})", pin, a.title.bold(), format_date(a.published_at));
        for line in a.body.lines() {
            println!("      {}", line);
        }
    }
}

pub fn render_faq(state: &FaqState) {
    ui::print_header("常见问题");
    for (category, entries) in state.grouped() {
        ui::print_sub_header(category);
        for faq in entries {
            let arrow = if state.is_expanded(&faq.id) { "▼" } else { "▶" };
            println!("  {} {}", arrow, faq.question.bold());
            if state.is_expanded(&faq.id) {
                for line in faq.answer.lines() {
                    println!("      {}", line);
                }
            }
        }
    }
}

pub fn render_history(page: &Page<AdminHistoryEntry>) {
    ui::print_header(&format!(
        "操作记录 (第 {}/{} 页，共 {} 条)",
        page.page, page.total_pages, page.total
    ));
    for e in &page.items {
        let target = match (&e.entity, &e.entity_id) {
            (Some(entity), Some(id)) => format!("{} {}", entity, id),
            (Some(entity), None) => entity.clone(),
            _ => String::new(),
        };
        println!(
            "  {} {:<12} {:<20} {}",
            e.created_at.format("%Y-%m-%d %H:%M"),
            e.actor.as_deref().unwrap_or("-"),
            e.action.cyan(),
            target
        );
    }
    if page.has_next() {
        println!("\n{} 使用 --page {} 查看下一页", *symbols::INFO, page.page + 1);
    }
}
