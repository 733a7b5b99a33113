// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const TITLE_TRUNCATE_LENGTH: usize = 60;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_DOWNLOAD_DIR: &str = "certificates";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_API_URL: &str = "LEARNCTL_API_URL";
pub const USER_AGENT: &str = concat!(clap::crate_name!(), "/", clap::crate_version!());

pub const HELP_TOKEN_GUIDE: &str = r#"
1. 使用浏览器登录学习平台。
2. 打开开发者工具:
   - 在 Windows / Linux 上: 按 F12 或 Ctrl+Shift+I
   - 在 macOS 上: 按 Cmd+Opt+I (⌘⌥I)
3. 切换到“控制台” (Console) 标签页。
4. 复制并粘贴以下代码到控制台，然后按 Enter 运行：
----------------------------------------------
copy(localStorage.getItem("token"))
----------------------------------------------
5. 此时 Token 已复制到剪贴板，执行 `learnctl login` 并粘贴即可。"#;

pub mod api {
    pub mod student {
        pub const COURSES: &str = "student/courses";
        pub const PROGRESS: &str = "student/courses/{slug}/progress";
        pub const COMPLETE: &str = "student/courses/lessons/{lesson_id}/complete";
        pub const INCOMPLETE: &str = "student/courses/lessons/{lesson_id}/incomplete";
        pub const SUBMIT_QUIZ: &str = "student/courses/lessons/{lesson_id}/submit-quiz";
        pub const SUBMIT_CODE: &str = "student/courses/lessons/{lesson_id}/submit-coding-problem";
        pub const RUN_CODE: &str = "student/courses/lessons/{lesson_id}/run-code";
    }
    pub mod catalog {
        pub const COURSES: &str = "courses";
        pub const COURSE: &str = "courses/{slug}";
    }
    pub mod certificates {
        pub const ISSUE: &str = "certificates";
        pub const MINE: &str = "certificates/me";
        pub const VERIFY: &str = "certificates/verify/{token}";
        pub const DOWNLOAD: &str = "certificates/{id}/download";
    }
    pub mod subscriptions {
        pub const PLANS: &str = "subscriptions/plans";
        pub const MINE: &str = "subscriptions/me";
        pub const SUBSCRIBE: &str = "subscriptions";
        pub const CANCEL: &str = "subscriptions/cancel";
    }
    pub mod coupons {
        pub const VALIDATE: &str = "coupons/validate";
        pub const ADMIN: &str = "admin/coupons";
        pub const ADMIN_ONE: &str = "admin/coupons/{id}";
    }
    pub mod ads {
        pub const ACTIVE: &str = "ads/active";
        pub const ANNOUNCEMENTS: &str = "announcements";
    }
    pub mod faq {
        pub const LIST: &str = "faqs";
    }
    pub mod admin {
        pub const HISTORY: &str = "admin/history";
    }
}
