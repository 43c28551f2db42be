use std::collections::HashMap;

use crate::thread::section::Comment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorCommentStat {
    pub total_count: usize,
    /// Next sub-index to hand out while rendering; 1-based, reset every pass.
    pub running_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositiveAggregate {
    pub count: usize,
    /// First positive comment in traversal order.
    pub anchor_id: Option<String>,
}

/// Result of one indexing pass over the non-deleted comments.
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    comments: Vec<Comment>,
    by_id: HashMap<String, usize>,
    stats: HashMap<String, AuthorCommentStat>,
    pub positive: PositiveAggregate,
}

impl CommentIndex {
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.by_id.get(id).map(|&i| &self.comments[i])
    }

    pub fn ordinal_of(&self, id: &str) -> Option<usize> {
        self.get(id).map(|c| c.ordinal)
    }

    /// Reset every author's running index to 1 before a rendering pass.
    pub fn reset_running_indices(&mut self) {
        for stat in self.stats.values_mut() {
            stat.running_index = 1;
        }
    }

    /// Sub-index for the author's next comment, or `None` when the author
    /// has a single comment. Advances the running index.
    pub fn next_sub_index(&mut self, author: &str) -> Option<(usize, usize)> {
        let stat = self.stats.get_mut(author)?;
        if stat.total_count <= 1 {
            return None;
        }
        let current = stat.running_index;
        stat.running_index += 1;
        Some((current, stat.total_count))
    }
}

/// Single forward pass: ordinals, per-author totals, positive aggregate.
///
/// `comments` must already exclude deleted ones.
pub fn index_comments(comments: Vec<Comment>) -> CommentIndex {
    let mut index = CommentIndex {
        comments: Vec::with_capacity(comments.len()),
        ..Default::default()
    };

    for (position, mut comment) in comments.into_iter().enumerate() {
        comment.ordinal = position + 1;

        index
            .stats
            .entry(comment.author.clone())
            .and_modify(|s| s.total_count += 1)
            .or_insert(AuthorCommentStat {
                total_count: 1,
                running_index: 1,
            });

        if comment.is_positive {
            index.positive.count += 1;
            if index.positive.anchor_id.is_none() {
                index.positive.anchor_id = Some(comment.id.clone());
            }
        }

        index.by_id.insert(comment.id.clone(), position);
        index.comments.push(comment);
    }

    index
}
