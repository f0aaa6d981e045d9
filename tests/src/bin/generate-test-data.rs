use chrono::{Duration, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

const NUM_USERS: usize = 5;

const NUM_POSTS: usize = 10;
const POST_WORD_COUNT: usize = 60;

const NUM_COMMENTS_PER_POST: usize = 40;
const COMMENT_MAX_WORD_COUNT: usize = 40;

// chance that a comment answers an earlier comment of the same post rather than the post
const REPLY_RATIO: f64 = 0.7;

fn gen_n_items(table: &str, columns: &str, n: usize, mut f: impl FnMut(usize) -> String) {
    println!("INSERT INTO \"{table}\" ({columns}) VALUES");
    for i in 0..n {
        if i != 0 {
            println!(",");
        }
        print!("    {}", f(i));
    }
    println!();
    println!("ON CONFLICT DO NOTHING;");
}

fn sql_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn main() {
    let mut rng = rand::thread_rng();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let users = (0..NUM_USERS)
        .map(|_| {
            let name = lipsum::lipsum_words_with_rng(&mut rng, 1).to_lowercase();
            let avatar = format!("https://avatars.example.org/{name}.png");
            (Uuid::new_v4(), name, avatar)
        })
        .collect::<Vec<_>>();

    // Generate posts
    gen_n_items(
        "Posts",
        "id, title, content, created_at",
        NUM_POSTS,
        |i| {
            format!(
                "({}, {}, {}, '{}')",
                i + 1,
                sql_str(&lipsum::lipsum_title_with_rng(&mut rng)),
                sql_str(&lipsum::lipsum_words_with_rng(&mut rng, POST_WORD_COUNT)),
                (start + Duration::days(i as i64)).to_rfc3339(),
            )
        },
    );

    // Generate comments, each post getting a thread with nested replies
    let mut next_id = 1;
    gen_n_items(
        "Comments",
        "id, post_id, parent_comment_id, content, user_id, author, avatar_url, created_at",
        NUM_POSTS * NUM_COMMENTS_PER_POST,
        |i| {
            let post = i / NUM_COMMENTS_PER_POST + 1;
            let nth = i % NUM_COMMENTS_PER_POST;
            let id = next_id;
            next_id += 1;
            // only earlier comments of the same post can be answered
            let parent = match nth > 0 && rng.gen_bool(REPLY_RATIO) {
                true => (id - rng.gen_range(1..=nth)).to_string(),
                false => String::from("NULL"),
            };
            let (user, name, avatar) = users
                .choose(&mut rng)
                .expect("users are generated first");
            let words = rng.gen_range(1..=COMMENT_MAX_WORD_COUNT);
            let date = start
                + Duration::days(post as i64 - 1)
                + Duration::minutes(nth as i64 * 45 + rng.gen_range(0..45));
            format!(
                "({id}, {post}, {parent}, {}, '{user}', {}, {}, '{}')",
                sql_str(&lipsum::lipsum_words_with_rng(&mut rng, words)),
                sql_str(name),
                match rng.gen_bool(0.5) {
                    true => sql_str(avatar),
                    false => String::from("NULL"),
                },
                date.to_rfc3339(),
            )
        },
    );
}
