use super::directory::{DirectoryResult, UserDirectory};
use super::model::{TaskUser, TaskWithUser, UserProfile};
use crate::tasks::Task;

/// Build the `user` object for a task.
///
/// `reveal_emails` is the privacy gate: only the owner and the volunteer see
/// contact addresses.
pub fn build_task_user(
    owner: &UserProfile,
    volunteer: Option<&UserProfile>,
    reveal_emails: bool,
) -> TaskUser {
    let mut user = TaskUser {
        username: owner.username.clone(),
        nickname: owner.attribute("nickname").map(str::to_string),
        given_name: owner.attribute("given_name").map(str::to_string),
        family_name: owner.attribute("family_name").map(str::to_string),
        ..TaskUser::default()
    };

    if reveal_emails {
        user.email = owner.attribute("email").map(str::to_string);
        user.volunteer_email = volunteer
            .and_then(|v| v.attribute("email"))
            .map(str::to_string);
    }

    user
}

/// Join a task with its owner's (and volunteer's) profile from the directory
pub async fn load_task_with_user<D: UserDirectory + ?Sized>(
    directory: &D,
    pool_id: &str,
    task: Task,
    requester_id: &str,
) -> DirectoryResult<TaskWithUser> {
    let owner = directory.find_by_subject(pool_id, &task.user_id).await?;

    let volunteer = match task.volunteer_id.as_deref() {
        Some(volunteer_id) => Some(directory.find_by_subject(pool_id, volunteer_id).await?),
        None => None,
    };

    let reveal_emails =
        task.user_id == requester_id || task.volunteer_id.as_deref() == Some(requester_id);
    let user = build_task_user(&owner, volunteer.as_ref(), reveal_emails);

    Ok(TaskWithUser { task, user })
}
