//! Built-in sample content backing the feed screens.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u32,
    pub title: &'static str,
    pub author: &'static str,
    pub body: &'static str,
    pub likes: u32,
    pub comments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Like,
    Comment,
    Follow,
    Mention,
    System,
}

impl ActivityKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ActivityKind::Like => "♥",
            ActivityKind::Comment => "✎",
            ActivityKind::Follow => "+",
            ActivityKind::Mention => "@",
            ActivityKind::System => "●",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: u32,
    pub kind: ActivityKind,
    pub message: &'static str,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub handle: &'static str,
    pub bio: &'static str,
    pub posts: u32,
    pub followers: u32,
    pub following: u32,
}

pub fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            title: "Shipping updates without the app store",
            author: "maya",
            body: "We moved our release train to over-the-air delivery last quarter. \
                   Rollbacks went from hours to minutes.",
            likes: 128,
            comments: 24,
        },
        Post {
            id: 2,
            title: "Weekend build: a terminal feed reader",
            author: "jord",
            body: "Turns out a feed client fits in a weekend if you skip the part \
                   where you design the protocol.",
            likes: 86,
            comments: 11,
        },
        Post {
            id: 3,
            title: "Notes on mandatory upgrade flows",
            author: "priya",
            body: "Forcing a restart is fine exactly once. The second time in a week, \
                   people uninstall.",
            likes: 203,
            comments: 57,
        },
        Post {
            id: 4,
            title: "Why we cache everything for five minutes",
            author: "sam",
            body: "Five minutes is long enough to survive a flaky network and short \
                   enough that nobody notices staleness.",
            likes: 49,
            comments: 8,
        },
        Post {
            id: 5,
            title: "Feature flags saved this launch",
            author: "maya",
            body: "Dark mode shipped off by default behind a flag. Good thing, \
                   because the contrast on the charts was unreadable.",
            likes: 171,
            comments: 33,
        },
    ]
}

pub fn sample_activity() -> Vec<Activity> {
    vec![
        Activity {
            id: 1,
            kind: ActivityKind::Like,
            message: "maya liked your post",
            read: false,
        },
        Activity {
            id: 2,
            kind: ActivityKind::Comment,
            message: "jord commented: \"same experience here\"",
            read: false,
        },
        Activity {
            id: 3,
            kind: ActivityKind::Follow,
            message: "priya started following you",
            read: true,
        },
        Activity {
            id: 4,
            kind: ActivityKind::Mention,
            message: "sam mentioned you in a thread",
            read: true,
        },
        Activity {
            id: 5,
            kind: ActivityKind::System,
            message: "Your weekly digest is ready",
            read: true,
        },
    ]
}

pub fn profile() -> Profile {
    Profile {
        name: "Alex Rivera",
        handle: "@alex",
        bio: "Builds small tools. Posts about release engineering.",
        posts: 42,
        followers: 1_218,
        following: 97,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_posts_are_unique_by_id() {
        let posts = sample_posts();
        let mut ids: Vec<u32> = posts.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), posts.len());
    }

    #[test]
    fn activity_mixes_read_and_unread() {
        let activity = sample_activity();
        assert!(activity.iter().any(|a| a.read));
        assert!(activity.iter().any(|a| !a.read));
    }
}
