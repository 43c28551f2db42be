pub mod annotate;
pub mod indexer;
pub mod page;
pub mod render;
pub mod section;
pub mod sentiment;

/// Header text of a comment removed by moderation.
pub const DELETED_PLACEHOLDER: &str = "サービス利用規約に基づき、このコメントは削除されました。";

/// Text shown in the comment container while the thread is still streaming in.
pub const LOADING_SENTINEL: &str = "コメントを読み込んでいます。";

/// Id of the host's comment container.
pub const COMMENTS_CONTAINER_ID: &str = "comments";

/// Prefix of the id attribute of a fully loaded comment section.
pub const COMMENT_ID_PREFIX: &str = "comment";

/// Class the host puts on inline `@handle` reply links.
pub const MENTION_CLASS: &str = "user-mention";

/// Host custom element that expands into a rich link preview.
pub const EMBED_PREVIEW_TAG: &str = "qiita-embed-ogp";

/// Class of the host's table-of-contents block.
pub const TOC_CLASS: &str = "p-items_toc";
