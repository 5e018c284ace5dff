//! システムコール層を登録する前のエントリポイントの振る舞い
//!
//! 登録はプロセス全体で一度きりなので、このテストは独立したバイナリにする

use std::ptr;

use newlib_shim::newlib::{_close_r, _getpid, _kill, _sbrk_r, _write_r};
use newlib_shim::reent::global_errno;
use newlib_shim::{installed, Errno, Reent};

#[test]
fn test_calls_before_install_are_enosys() {
    assert!(installed().is_none());

    let mut r = Reent::new();
    assert_eq!(unsafe { _close_r(&mut r, 3) }, -1);
    assert_eq!(r.errno(), Errno::ENOSYS);

    r.errno = 0;
    let msg = b"boot";
    assert_eq!(unsafe { _write_r(&mut r, 1, msg.as_ptr().cast(), msg.len()) }, -1);
    assert_eq!(r.errno(), Errno::ENOSYS);

    r.errno = 0;
    assert_eq!(unsafe { _sbrk_r(&mut r, 16) } as usize, usize::MAX);
    assert_eq!(r.errno(), Errno::ENOSYS);

    assert_eq!(unsafe { _close_r(ptr::null_mut(), 3) }, -1);
    assert_eq!(global_errno(), Errno::ENOSYS);

    assert_eq!(_kill(1, 9), -1);
    assert_eq!(global_errno(), Errno::ENOSYS);

    assert_eq!(_getpid(), 0);
    assert!(installed().is_none());
}
