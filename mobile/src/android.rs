//! JNI bindings of the `mobile.Mobile` Java class.
//!
//! Every method returns a `String` on success, or throws a
//! `java.lang.Exception` describing the failure.

#![allow(clippy::needless_pass_by_value, non_snake_case)]

use std::ptr;

use derive_more::{Display, From};
use flutter_greeter::{log::prelude::*, GreetError};
use jni::{
    objects::{JClass, JString},
    sys::jstring,
    JNIEnv,
};

/// Class of the exceptions thrown on failures.
const EXCEPTION_CLASS: &str = "java/lang/Exception";

/// Errors of serving a JNI call.
#[derive(Debug, Display, From)]
enum CallError {
    /// Java objects couldn't be accessed.
    #[display(fmt = "JNI call failed: {}", _0)]
    Jni(jni::errors::Error),

    /// Greeting couldn't be produced.
    #[display(fmt = "{}", _0)]
    Greet(GreetError),
}

/// `static String sayHi(String name) throws Exception`
#[no_mangle]
pub extern "system" fn Java_mobile_Mobile_sayHi(
    env: JNIEnv<'_>,
    _class: JClass<'_>,
    name: JString<'_>,
) -> jstring {
    let res = get_string(&env, name).and_then(|name| {
        crate::say_hi(&name).map_err(|e| e.as_ref().clone().into())
    });
    respond(&env, res)
}

/// `static String sayHiWithDuration(String name, String duration)
/// throws Exception`
#[no_mangle]
pub extern "system" fn Java_mobile_Mobile_sayHiWithDuration(
    env: JNIEnv<'_>,
    _class: JClass<'_>,
    name: JString<'_>,
    duration: JString<'_>,
) -> jstring {
    let res = get_string(&env, name).and_then(|name| {
        let duration = get_string(&env, duration)?;
        crate::say_hi_with_duration(&name, &duration)
            .map_err(|e| e.as_ref().clone().into())
    });
    respond(&env, res)
}

/// Copies the provided Java `String` into a Rust [`String`].
fn get_string(env: &JNIEnv<'_>, s: JString<'_>) -> Result<String, CallError> {
    Ok(env.get_string(s)?.into())
}

/// Converts the provided result into a Java `String`, or throws an exception
/// returning `null`.
fn respond(env: &JNIEnv<'_>, res: Result<String, CallError>) -> jstring {
    let res = res.and_then(|s| Ok(env.new_string(s)?.into_inner()));
    match res {
        Ok(s) => s,
        Err(e) => {
            let msg = e.to_string();
            if let Err(throw_err) = env.throw_new(EXCEPTION_CLASS, msg) {
                error!("Failed to throw `{}`: {}", e, throw_err);
            }
            ptr::null_mut()
        }
    }
}
